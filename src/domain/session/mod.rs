//! Recording session domain module

mod capture_state;
mod playback;

pub use capture_state::{CaptureLifecycle, CaptureState, InvalidStateTransition};
pub use playback::{PlaybackState, PlaybackTracker};
