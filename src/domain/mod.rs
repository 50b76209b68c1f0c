//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod auth;
pub mod config;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use auth::{Credentials, Identity};
pub use config::{AppConfig, StoreKind};
pub use error::*;
pub use recording::{DurationLabel, EntryId, QualityPreset, RecordingMetadata, RemoteId};
pub use session::{CaptureLifecycle, CaptureState, PlaybackState, PlaybackTracker};
