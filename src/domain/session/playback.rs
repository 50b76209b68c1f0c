//! Per-recording playback state
//!
//! Every recording has its own play/pause state. At most one recording is
//! active (playing or paused) at a time; every other one is stopped.

use std::collections::HashMap;
use std::fmt;

use crate::domain::recording::EntryId;

/// Playback state of a single recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks playback state keyed by recording.
///
/// Only non-stopped recordings are stored, so the map never holds more than
/// one entry.
#[derive(Debug, Default)]
pub struct PlaybackTracker {
    states: HashMap<EntryId, PlaybackState>,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one recording; unknown recordings are stopped
    pub fn state_of(&self, id: EntryId) -> PlaybackState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// The active recording and its state, if any
    pub fn active(&self) -> Option<(EntryId, PlaybackState)> {
        self.states.iter().next().map(|(id, state)| (*id, *state))
    }

    /// Mark a recording as playing, stopping whatever was active before
    pub fn set_playing(&mut self, id: EntryId) {
        self.states.clear();
        self.states.insert(id, PlaybackState::Playing);
    }

    /// Mark the playing recording as paused. Returns false if it was not playing.
    pub fn set_paused(&mut self, id: EntryId) -> bool {
        match self.states.get_mut(&id) {
            Some(state @ PlaybackState::Playing) => {
                *state = PlaybackState::Paused;
                true
            }
            _ => false,
        }
    }

    /// Mark a recording as stopped
    pub fn set_stopped(&mut self, id: EntryId) {
        self.states.remove(&id);
    }

    /// Stop everything
    pub fn reset(&mut self) {
        self.states.clear();
    }
}
