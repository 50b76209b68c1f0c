//! Capture infrastructure module
//!
//! Microphone capture through cpal. Finished recordings are stored as FLAC.

mod cpal_capture;
mod flac_encoder;

pub use cpal_capture::{CpalCapture, CpalCaptureHandle};
pub use flac_encoder::{encode_to_flac, EncodingError};
