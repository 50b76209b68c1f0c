//! voice-memos CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_memos::cli::{
    app::load_merged_config,
    args::{Cli, Commands},
    auth_cmd::{handle_login, handle_logout, handle_register, handle_whoami},
    config_cmd::handle_config_command,
    presenter::Presenter,
    run_session, CommandError, EXIT_SUCCESS,
};
use voice_memos::domain::config::{AppConfig, StoreKind};
use voice_memos::domain::recording::QualityPreset;
use voice_memos::infrastructure::XdgConfigStore;

/// Default log filter when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "voice_memos=warn";

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut presenter = Presenter::new();

    match run(cli, &mut presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, presenter: &mut Presenter) -> Result<(), CommandError> {
    // Build CLI config from args
    let cli_config = AppConfig {
        quality: cli.quality.map(|q| QualityPreset::from(q).to_string()),
        store: cli.store.map(|s| StoreKind::from(s).to_string()),
        recordings_dir: cli.recordings_dir.clone(),
        ..Default::default()
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            handle_config_command(action, &store, presenter).await?;
            Ok(())
        }
        Some(Commands::Login(args)) => {
            let config = load_merged_config(cli_config).await;
            handle_login(args, &config, presenter).await
        }
        Some(Commands::Register(args)) => {
            let config = load_merged_config(cli_config).await;
            handle_register(args, &config, presenter).await
        }
        Some(Commands::Logout) => {
            let config = load_merged_config(cli_config).await;
            handle_logout(&config, presenter).await
        }
        Some(Commands::Whoami) => {
            let config = load_merged_config(cli_config).await;
            handle_whoami(&config, presenter).await
        }
        Some(Commands::Session) | None => {
            let config = load_merged_config(cli_config).await;
            run_session(&config, presenter).await
        }
    }
}
