//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::config::StoreKind;
use crate::domain::recording::QualityPreset;

/// voice-memos - record voice memos and sync them to Cloud Firestore
#[derive(Parser, Debug)]
#[command(name = "voice-memos")]
#[command(version)]
#[command(about = "Record, play back and sync voice memos with Cloud Firestore")]
#[command(long_about = None)]
pub struct Cli {
    /// Recording quality preset
    #[arg(short = 'q', long, value_name = "QUALITY", global = true)]
    pub quality: Option<QualityArg>,

    /// Where recording metadata is stored
    #[arg(short = 's', long, value_name = "STORE", global = true)]
    pub store: Option<StoreArg>,

    /// Directory finished recordings are written to
    #[arg(long, value_name = "DIR", global = true)]
    pub recordings_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive recording session (default)
    Session,
    /// Sign in with email and password
    Login(AuthArgs),
    /// Create an account and sign in to it
    Register(AuthArgs),
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Email/password arguments
#[derive(clap::Args, Debug)]
pub struct AuthArgs {
    /// Account email
    #[arg(short = 'e', long)]
    pub email: String,

    /// Account password
    #[arg(short = 'p', long, env = "VOICE_MEMOS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// `config` subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a settings file with the defaults
    Init,
    /// Store a setting
    Set { key: String, value: String },
    /// Print one setting
    Get { key: String },
    /// Remove a setting so the default or environment applies again
    Unset { key: String },
    /// Print every setting
    List,
    /// Print the settings file location
    Path,
}

/// Quality argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    High,
    Low,
}

impl From<QualityArg> for QualityPreset {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::High => QualityPreset::High,
            QualityArg::Low => QualityPreset::Low,
        }
    }
}

/// Store argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    Firestore,
    Memory,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Firestore => StoreKind::Firestore,
            StoreArg::Memory => StoreKind::Memory,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "project_id",
    "collection",
    "quality",
    "store",
    "recordings_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice-memos"]);
        assert!(cli.quality.is_none());
        assert!(cli.store.is_none());
        assert!(cli.recordings_dir.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::parse_from(["voice-memos", "-q", "low", "--store", "memory"]);
        assert_eq!(cli.quality, Some(QualityArg::Low));
        assert_eq!(cli.store, Some(StoreArg::Memory));
    }

    #[test]
    fn cli_parses_overrides_after_subcommand() {
        let cli = Cli::parse_from(["voice-memos", "session", "--quality", "high"]);
        assert!(matches!(cli.command, Some(Commands::Session)));
        assert_eq!(cli.quality, Some(QualityArg::High));
    }

    #[test]
    fn cli_rejects_unknown_quality() {
        assert!(Cli::try_parse_from(["voice-memos", "--quality", "ultra"]).is_err());
    }

    #[test]
    fn cli_parses_login() {
        let cli = Cli::parse_from([
            "voice-memos",
            "login",
            "--email",
            "ada@example.com",
            "--password",
            "secret1",
        ]);
        match cli.command {
            Some(Commands::Login(args)) => {
                assert_eq!(args.email, "ada@example.com");
                assert_eq!(args.password.as_deref(), Some("secret1"));
            }
            other => panic!("Expected Login command, got {:?}", other),
        }
    }

    #[test]
    fn cli_requires_email_for_register() {
        assert!(Cli::try_parse_from(["voice-memos", "register"]).is_err());
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-memos", "config", "set", "quality", "low"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "quality");
            assert_eq!(value, "low");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_parses_config_unset() {
        let cli = Cli::parse_from(["voice-memos", "config", "unset", "store"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Unset { ref key }
            }) if key == "store"
        ));
    }

    #[test]
    fn quality_arg_converts_to_preset() {
        assert_eq!(QualityPreset::from(QualityArg::High), QualityPreset::High);
        assert_eq!(QualityPreset::from(QualityArg::Low), QualityPreset::Low);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("project_id"));
        assert!(is_valid_config_key("recordings_dir"));
        assert!(!is_valid_config_key("duration"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
