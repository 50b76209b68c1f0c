//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! and the command runners.

pub mod app;
pub mod args;
pub mod auth_cmd;
pub mod config_cmd;
pub mod presenter;
pub mod session_app;
pub mod session_cmd;
pub mod signals;

// Re-export commonly used types
pub use app::{CommandError, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{AuthArgs, Cli, Commands, ConfigAction};
pub use presenter::Presenter;
pub use session_app::run_session;
pub use session_cmd::SessionCommand;
