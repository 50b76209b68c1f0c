//! Recording domain module

mod duration_label;
mod metadata;
mod quality;

pub use duration_label::DurationLabel;
pub use metadata::{EntryId, RecordingMetadata, RemoteId};
pub use quality::{QualityPreset, ALL_QUALITIES};
