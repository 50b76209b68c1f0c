//! Cross-platform microphone capture using cpal
//!
//! Each capture owns a dedicated thread holding the input stream
//! (`cpal::Stream` is not `Send`). Samples are downmixed to mono while
//! recording; on finalize they are resampled to the preset rate, encoded to
//! FLAC and written under the recordings directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use super::flac_encoder::encode_to_flac;
use crate::application::ports::{
    AudioCapture, CaptureError, CaptureHandle, CaptureMode, FinishedCapture, Permission,
};
use crate::domain::recording::QualityPreset;
use crate::infrastructure::playback::RodioPlayer;

/// Microphone capture backed by the default cpal input device
pub struct CpalCapture {
    recordings_dir: PathBuf,
    player: RodioPlayer,
    mode: StdMutex<Option<CaptureMode>>,
}

impl CpalCapture {
    /// Create a capture adapter writing recordings into `recordings_dir`
    pub fn new(recordings_dir: impl Into<PathBuf>, player: RodioPlayer) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            player,
            mode: StdMutex::new(None),
        }
    }

    /// Last audio mode applied
    pub fn mode(&self) -> Option<CaptureMode> {
        self.mode.lock().ok().and_then(|mode| *mode)
    }

    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoAudioDevice)
    }

    /// Pick an input configuration close to `target_rate`.
    /// Prefers fewer channels; stereo is mixed down.
    fn get_input_config(
        device: &cpal::Device,
        target_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= target_rate
                && config.max_sample_rate().0 >= target_rate;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let current_includes_target = current.min_sample_rate().0 <= target_rate
                        && current.max_sample_rate().0 >= target_rate;
                    let fewer_channels = config.channels() < current.channels();
                    (includes_target && !current_includes_target)
                        || (includes_target == current_includes_target && fewer_channels)
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(CaptureError::StartFailed(
            "No suitable config found".into(),
        ))?;

        let sample_rate = SampleRate(target_rate.clamp(
            config_range.min_sample_rate().0,
            config_range.max_sample_rate().0,
        ));

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Resample mono audio from the device rate to the preset rate
    fn resample(
        samples: &[i16],
        source_rate: u32,
        target_rate: u32,
    ) -> Result<Vec<i16>, CaptureError> {
        if source_rate == target_rate {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = target_rate as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            target_rate as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| CaptureError::RecordingFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());

            let mut chunk = samples_f32[input_pos..end_pos].to_vec();
            chunk.resize(frames_needed, 0.0);

            let resampled = resampler.process(&[chunk], None).map_err(|e| {
                CaptureError::RecordingFailed(format!("Resampling failed: {}", e))
            })?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Mix interleaved multi-channel audio to mono
    fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / chunk.len() as i32) as i16
            })
            .collect()
    }

    /// Build and start the input stream. Runs on the capture thread.
    fn open_stream(
        target_rate: u32,
        buffer: &Arc<StdMutex<Vec<i16>>>,
        is_recording: &Arc<AtomicBool>,
    ) -> Result<(cpal::Stream, u32), CaptureError> {
        let device = Self::get_input_device()?;
        let (config, sample_format) = Self::get_input_config(&device, target_rate)?;
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        let stream = match sample_format {
            SampleFormat::I16 => {
                let buffer = Arc::clone(buffer);
                let is_recording = Arc::clone(is_recording);
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if is_recording.load(Ordering::SeqCst) {
                            let mono = CpalCapture::downmix(data, channels);
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| error!(error = %err, "audio input stream error"),
                    None,
                )
            }

            SampleFormat::F32 => {
                let buffer = Arc::clone(buffer);
                let is_recording = Arc::clone(is_recording);
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if is_recording.load(Ordering::SeqCst) {
                            let i16_data: Vec<i16> =
                                data.iter().map(|&s| (s * 32767.0) as i16).collect();
                            let mono = CpalCapture::downmix(&i16_data, channels);
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| error!(error = %err, "audio input stream error"),
                    None,
                )
            }

            _ => {
                return Err(CaptureError::StartFailed(
                    "Unsupported sample format".into(),
                ))
            }
        }
        .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        Ok((stream, sample_rate))
    }

    fn file_name() -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        format!("recording-{}.flac", now)
    }
}

/// `file://` URI for a local path
fn file_locator(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[async_trait]
impl AudioCapture for CpalCapture {
    async fn request_permission(&self) -> Result<Permission, CaptureError> {
        // Desktop hosts grant access when an input device is present
        let has_device = tokio::task::spawn_blocking(|| Self::get_input_device().is_ok())
            .await
            .map_err(|e| CaptureError::PermissionRequestFailed(format!("Task join error: {}", e)))?;

        Ok(if has_device {
            Permission::Granted
        } else {
            Permission::Denied
        })
    }

    async fn configure_mode(&self, mode: CaptureMode) -> Result<(), CaptureError> {
        // Desktop hosts have no audio session category to switch
        debug!(
            allows_recording = mode.allows_recording,
            plays_in_silent_mode = mode.plays_in_silent_mode,
            "audio mode applied"
        );
        let mut current = self
            .mode
            .lock()
            .map_err(|e| CaptureError::ModeFailed(e.to_string()))?;
        *current = Some(mode);
        Ok(())
    }

    async fn begin(&self, quality: QualityPreset) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        tokio::fs::create_dir_all(&self.recordings_dir)
            .await
            .map_err(|e| CaptureError::StartFailed(format!("Failed to create recordings dir: {}", e)))?;
        let dir = tokio::fs::canonicalize(&self.recordings_dir)
            .await
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        let path = dir.join(Self::file_name());

        let target_rate = quality.sample_rate();
        let buffer = Arc::new(StdMutex::new(Vec::new()));
        let is_recording = Arc::new(AtomicBool::new(true));
        let device_sample_rate = Arc::new(AtomicU32::new(0));

        let (ready_tx, ready_rx) = oneshot::channel();
        let thread = {
            let buffer = Arc::clone(&buffer);
            let is_recording = Arc::clone(&is_recording);
            let device_sample_rate = Arc::clone(&device_sample_rate);

            std::thread::Builder::new()
                .name("cpal-capture".to_string())
                .spawn(move || {
                    let stream = match CpalCapture::open_stream(target_rate, &buffer, &is_recording) {
                        Ok((stream, rate)) => {
                            device_sample_rate.store(rate, Ordering::SeqCst);
                            let _ = ready_tx.send(Ok(rate));
                            stream
                        }
                        Err(e) => {
                            is_recording.store(false, Ordering::SeqCst);
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };

                    // Keep the stream alive until stopped
                    while is_recording.load(Ordering::SeqCst) {
                        std::thread::sleep(StdDuration::from_millis(50));
                    }

                    drop(stream);
                })
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?
        };

        let device_rate = ready_rx
            .await
            .map_err(|_| CaptureError::StartFailed("Capture thread exited".into()))??;

        info!(path = %path.display(), device_rate, target_rate, "microphone capture running");

        Ok(Box::new(CpalCaptureHandle {
            locator: file_locator(&path),
            path,
            target_rate,
            buffer,
            device_sample_rate,
            is_recording,
            thread: Some(thread),
            player: self.player.clone(),
        }))
    }
}

/// Handle to a running cpal capture. Dropping it stops the stream.
pub struct CpalCaptureHandle {
    path: PathBuf,
    locator: String,
    target_rate: u32,
    buffer: Arc<StdMutex<Vec<i16>>>,
    device_sample_rate: Arc<AtomicU32>,
    is_recording: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    player: RodioPlayer,
}

impl CpalCaptureHandle {
    /// Stop the stream and wait for the capture thread to exit
    async fn stop_stream(&mut self) -> Result<(), CaptureError> {
        self.is_recording.store(false, Ordering::SeqCst);

        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .map_err(|e| CaptureError::RecordingFailed(format!("Task join error: {}", e)))?
                .map_err(|_| CaptureError::RecordingFailed("Capture thread panicked".into()))?;
        }

        Ok(())
    }

    fn take_samples(&self) -> Result<Vec<i16>, CaptureError> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|e| CaptureError::RecordingFailed(e.to_string()))?;
        Ok(std::mem::take(&mut *buffer))
    }
}

#[async_trait]
impl CaptureHandle for CpalCaptureHandle {
    fn locator(&self) -> &str {
        &self.locator
    }

    async fn finalize(mut self: Box<Self>) -> Result<FinishedCapture, CaptureError> {
        self.stop_stream().await?;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::RecordingFailed("Sample rate not set".into()));
        }

        let samples = self.take_samples()?;
        if samples.is_empty() {
            return Err(CaptureError::NoAudio);
        }

        let duration_ms = samples.len() as u64 * 1000 / sample_rate as u64;
        let target_rate = self.target_rate;

        let flac = tokio::task::spawn_blocking(move || {
            let resampled = CpalCapture::resample(&samples, sample_rate, target_rate)?;
            encode_to_flac(&resampled, target_rate)
                .map_err(|e| CaptureError::RecordingFailed(e.to_string()))
        })
        .await
        .map_err(|e| CaptureError::RecordingFailed(format!("Encode task error: {}", e)))??;

        tokio::fs::write(&self.path, &flac)
            .await
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;
        debug!(path = %self.path.display(), bytes = flac.len(), duration_ms, "recording written");

        let audio = self
            .player
            .load(&self.path)
            .map_err(|e| CaptureError::LoadFailed(e.to_string()))?;

        Ok(FinishedCapture {
            duration_ms,
            audio: Box::new(audio),
        })
    }

    async fn discard(mut self: Box<Self>) -> Result<(), CaptureError> {
        self.stop_stream().await?;
        self.take_samples()?;
        debug!(path = %self.path.display(), "capture discarded");
        Ok(())
    }
}

impl Drop for CpalCaptureHandle {
    fn drop(&mut self) {
        self.is_recording.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel() {
        let mono = vec![100i16, 200, 300];
        assert_eq!(CpalCapture::downmix(&mono, 1), mono);
    }

    #[test]
    fn downmix_two_channels() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(CpalCapture::downmix(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![1i16, 2, 3, 4];
        assert_eq!(CpalCapture::resample(&samples, 16_000, 16_000).unwrap(), samples);
    }

    #[test]
    fn resample_changes_length_by_ratio() {
        let samples = vec![0i16; 48_000];
        let resampled = CpalCapture::resample(&samples, 48_000, 16_000).unwrap();
        assert_eq!(resampled.len(), 16_000);
    }

    #[test]
    fn file_names_are_flac() {
        let name = CpalCapture::file_name();
        assert!(name.starts_with("recording-"));
        assert!(name.ends_with(".flac"));
    }

    #[test]
    fn locator_is_file_uri() {
        let locator = file_locator(Path::new("/tmp/recordings/recording-1.flac"));
        assert_eq!(locator, "file:///tmp/recordings/recording-1.flac");
    }

    #[tokio::test]
    async fn configure_mode_is_remembered() {
        let capture = CpalCapture::new(std::env::temp_dir(), RodioPlayer::new());
        assert!(capture.mode().is_none());
        capture.configure_mode(CaptureMode::recording()).await.unwrap();
        assert_eq!(capture.mode(), Some(CaptureMode::recording()));
    }

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn can_record_briefly() {
        let dir = tempfile::tempdir().unwrap();
        let capture = CpalCapture::new(dir.path(), RodioPlayer::new());
        let handle = capture.begin(QualityPreset::Low).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(300)).await;
        let finished = handle.finalize().await.unwrap();
        assert!(finished.duration_ms > 0);
    }
}
