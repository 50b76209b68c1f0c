//! Recording identifiers and the remote metadata record

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::EmptyRemoteIdError;

use super::DurationLabel;

/// Local identifier of a finished recording.
///
/// Assigned when a capture is stopped, increasing in stop-time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the remote store assigned to a metadata record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyRemoteIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyRemoteIdError);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteId {
    type Error = EmptyRemoteIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document written to the remote store for every finished recording.
/// Describes the recording, never carries the audio bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// `M:SS` duration label
    pub duration: String,
    /// Locator of the audio file on this device
    pub file: String,
}

impl RecordingMetadata {
    pub fn new(duration: &DurationLabel, file: impl Into<String>) -> Self {
        Self {
            duration: duration.to_string(),
            file: file.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_id_rejects_empty() {
        assert!(RemoteId::new("").is_err());
        assert!(RemoteId::new("   ").is_err());
    }

    #[test]
    fn remote_id_keeps_value() {
        let id = RemoteId::new("AbC123").unwrap();
        assert_eq!(id.as_str(), "AbC123");
        assert_eq!(id.to_string(), "AbC123");
    }

    #[test]
    fn remote_id_deserialize_rejects_empty() {
        let parsed: Result<RemoteId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn entry_ids_order_by_value() {
        assert!(EntryId::new(1) < EntryId::new(2));
        assert_eq!(EntryId::new(7).get(), 7);
    }

    #[test]
    fn metadata_uses_label_text() {
        let metadata = RecordingMetadata::new(
            &DurationLabel::from_millis(125_000),
            "file:///tmp/recording.flac",
        );
        assert_eq!(metadata.duration, "2:05");
        assert_eq!(metadata.file, "file:///tmp/recording.flac");
    }
}
