//! Duration label value object

use std::fmt;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// `M:SS` label shown next to a finished recording.
///
/// Seconds are the fractional part of the minute count scaled to 60 and
/// rounded, so the label is an approximation rather than an exact split.
/// A fraction that rounds up to 60 carries into the minutes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DurationLabel {
    minutes: u64,
    seconds: u8,
}

impl DurationLabel {
    /// Derive the label from a capture duration in milliseconds
    pub fn from_millis(milliseconds: u64) -> Self {
        let minutes = milliseconds as f64 / MILLIS_PER_MINUTE;
        let whole = minutes.floor();
        let seconds = ((minutes - whole) * 60.0).round() as u64;

        let (minutes, seconds) = if seconds >= 60 {
            (whole as u64 + 1, 0)
        } else {
            (whole as u64, seconds)
        };

        Self {
            minutes,
            seconds: seconds as u8,
        }
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

impl fmt::Display for DurationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}
