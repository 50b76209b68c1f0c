//! Audio capture port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::QualityPreset;

use super::playback::PlayableAudio;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Failed to request microphone permission: {0}")]
    PermissionRequestFailed(String),

    #[error("Failed to configure audio mode: {0}")]
    ModeFailed(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to save recording: {0}")]
    WriteFailed(String),

    #[error("Failed to load recording for playback: {0}")]
    LoadFailed(String),

    #[error("No audio captured")]
    NoAudio,

    #[error("No audio device available")]
    NoAudioDevice,
}

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Platform audio mode applied before capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMode {
    pub allows_recording: bool,
    pub plays_in_silent_mode: bool,
}

impl CaptureMode {
    /// Record while still allowing playback when the device is silenced
    pub const fn recording() -> Self {
        Self {
            allows_recording: true,
            plays_in_silent_mode: true,
        }
    }
}

/// A finalized capture, ready for playback
pub struct FinishedCapture {
    pub duration_ms: u64,
    pub audio: Box<dyn PlayableAudio>,
}

/// Live handle to an in-progress capture.
///
/// Dropping a handle without finalizing it must stop the capture.
#[async_trait]
pub trait CaptureHandle: Send + Sync {
    /// Locator of the file the capture is written to
    fn locator(&self) -> &str;

    /// Stop capturing and produce the duration and a playable handle
    async fn finalize(self: Box<Self>) -> Result<FinishedCapture, CaptureError>;

    /// Stop capturing and throw the audio away
    async fn discard(self: Box<Self>) -> Result<(), CaptureError>;
}

/// Port for the device capture subsystem
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Ask the platform for permission to record
    async fn request_permission(&self) -> Result<Permission, CaptureError>;

    /// Apply the platform audio mode
    async fn configure_mode(&self, mode: CaptureMode) -> Result<(), CaptureError>;

    /// Begin capturing at the given quality
    async fn begin(&self, quality: QualityPreset) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}
