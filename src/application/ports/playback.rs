//! Playback port interface

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during playback
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Failed to decode recording: {0}")]
    DecodeFailed(String),
}

/// A loaded recording that can be played, paused, and stopped.
///
/// `play` after `pause` resumes; `play` after `stop`, or after the audio
/// played to its end, starts from the beginning.
#[async_trait]
pub trait PlayableAudio: Send + Sync {
    async fn play(&self) -> Result<(), PlaybackError>;

    async fn pause(&self) -> Result<(), PlaybackError>;

    async fn stop(&self) -> Result<(), PlaybackError>;

    /// Whether the last `play` ran to the end of the audio
    fn is_finished(&self) -> bool;
}
