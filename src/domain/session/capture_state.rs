//! Capture lifecycle state machine

use std::fmt;
use thiserror::Error;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
    Uploading,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Uploading => "uploading",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Capture lifecycle.
///
/// State machine:
///   IDLE -> RECORDING (begin)
///   RECORDING -> UPLOADING (finish)
///   RECORDING -> IDLE (abandon)
///   UPLOADING -> IDLE (settle)
#[derive(Debug, Default)]
pub struct CaptureLifecycle {
    state: CaptureState,
}

impl CaptureLifecycle {
    /// Create a new lifecycle in idle state
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Fail unless idle, without transitioning
    pub fn ensure_idle(&self, action: &str) -> Result<(), InvalidStateTransition> {
        self.require(CaptureState::Idle, action)
    }

    /// Transition from IDLE to RECORDING
    pub fn begin(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(CaptureState::Idle, "start recording")?;
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to UPLOADING
    pub fn finish(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(CaptureState::Recording, "stop recording")?;
        self.state = CaptureState::Uploading;
        Ok(())
    }

    /// Transition from RECORDING to IDLE without producing a recording
    pub fn abandon(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(CaptureState::Recording, "abandon recording")?;
        self.state = CaptureState::Idle;
        Ok(())
    }

    /// Transition from UPLOADING to IDLE
    pub fn settle(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(CaptureState::Uploading, "settle upload")?;
        self.state = CaptureState::Idle;
        Ok(())
    }

    fn require(&self, expected: CaptureState, action: &str) -> Result<(), InvalidStateTransition> {
        if self.state != expected {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}
