//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod identity;
pub mod playback;
pub mod store;

// Re-export common types
pub use capture::{
    AudioCapture, CaptureError, CaptureHandle, CaptureMode, FinishedCapture, Permission,
};
pub use config::ConfigStore;
pub use identity::{AuthError, IdentityProvider};
pub use playback::{PlayableAudio, PlaybackError};
pub use store::{DocumentStore, StoreError};
