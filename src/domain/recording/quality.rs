//! Capture quality preset value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidQualityError;

/// All available quality presets
pub const ALL_QUALITIES: &[QualityPreset] = &[QualityPreset::High, QualityPreset::Low];

/// Capture quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    #[default]
    High,
    Low,
}

impl QualityPreset {
    /// Sample rate the finished recording is stored at
    pub const fn sample_rate(&self) -> u32 {
        match self {
            Self::High => 44_100,
            Self::Low => 16_000,
        }
    }

    /// Get the string identifier for this preset
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl FromStr for QualityPreset {
    type Err = InvalidQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(InvalidQualityError { input: s.to_string() }),
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_qualities() {
        for quality in ALL_QUALITIES {
            assert_eq!(quality.as_str().parse::<QualityPreset>().unwrap(), *quality);
        }
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(" HIGH ".parse::<QualityPreset>().unwrap(), QualityPreset::High);
    }

    #[test]
    fn parse_invalid() {
        let err = "ultra".parse::<QualityPreset>().unwrap_err();
        assert!(err.to_string().contains("ultra"));
    }

    #[test]
    fn default_is_high() {
        assert_eq!(QualityPreset::default(), QualityPreset::High);
        assert_eq!(QualityPreset::High.sample_rate(), 44_100);
        assert_eq!(QualityPreset::Low.sample_rate(), 16_000);
    }
}
