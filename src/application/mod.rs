//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod auth;
pub mod ports;
pub mod session;

// Re-export use cases
pub use auth::{AuthUseCase, AuthUseCaseError};
pub use session::{
    DeleteFailure, EntryView, RecordingSessionManager, RetryReport, SessionConfig, SessionError,
    SessionSnapshot, UnsyncedView,
};
