//! Rodio-based playback adapter
//!
//! `OutputStream` is not `Send`, so it lives on a dedicated thread for as
//! long as any player clone exists. Sounds share the stream's handle.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use crate::application::ports::{PlayableAudio, PlaybackError};

/// Output device opened on first playback
struct OutputThread {
    handle: OutputStreamHandle,
    // Dropping the sender lets the output thread exit
    _shutdown: mpsc::Sender<()>,
}

impl OutputThread {
    fn open() -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("rodio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((_stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|_| PlaybackError::DeviceNotAvailable("Output thread exited".into()))?
            .map_err(PlaybackError::DeviceNotAvailable)?;

        debug!("audio output opened");

        Ok(Self {
            handle,
            _shutdown: shutdown_tx,
        })
    }
}

/// Shared audio output; clones use the same device stream
#[derive(Clone, Default)]
pub struct RodioPlayer {
    output: Arc<StdMutex<Option<Arc<OutputThread>>>>,
}

impl RodioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a recording from disk. Fails if the file cannot be decoded.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<RodioSound, PlaybackError> {
        let path = path.as_ref().to_path_buf();
        open_decoder(&path)?;

        Ok(RodioSound {
            inner: Arc::new(SoundInner {
                path,
                player: self.clone(),
                sink: StdMutex::new(None),
            }),
        })
    }

    fn output_handle(&self) -> Result<OutputStreamHandle, PlaybackError> {
        let mut output = self
            .output
            .lock()
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

        if let Some(thread) = output.as_ref() {
            return Ok(thread.handle.clone());
        }

        let thread = Arc::new(OutputThread::open()?);
        let handle = thread.handle.clone();
        *output = Some(thread);
        Ok(handle)
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path)
        .map_err(|e| PlaybackError::DecodeFailed(format!("{}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::DecodeFailed(e.to_string()))
}

struct SoundInner {
    path: PathBuf,
    player: RodioPlayer,
    sink: StdMutex<Option<Sink>>,
}

impl SoundInner {
    fn play_sync(&self) -> Result<(), PlaybackError> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

        // Resume a paused sound; a finished or stopped one starts over
        if let Some(current) = sink.as_ref() {
            if !current.empty() {
                current.play();
                return Ok(());
            }
        }

        let handle = self.player.output_handle()?;
        let fresh =
            Sink::try_new(&handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
        fresh.append(open_decoder(&self.path)?);
        fresh.play();
        debug!(path = %self.path.display(), "playback started");

        *sink = Some(fresh);
        Ok(())
    }

    fn pause_sync(&self) -> Result<(), PlaybackError> {
        let sink = self
            .sink
            .lock()
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
        if let Some(sink) = sink.as_ref() {
            sink.pause();
        }
        Ok(())
    }

    fn finished(&self) -> bool {
        match self.sink.lock() {
            Ok(sink) => sink.as_ref().is_some_and(|sink| sink.empty()),
            Err(_) => false,
        }
    }

    fn stop_sync(&self) -> Result<(), PlaybackError> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
        if let Some(sink) = sink.take() {
            sink.stop();
        }
        Ok(())
    }
}

/// A recording loaded for playback
pub struct RodioSound {
    inner: Arc<SoundInner>,
}

impl RodioSound {
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

#[async_trait]
impl PlayableAudio for RodioSound {
    async fn play(&self) -> Result<(), PlaybackError> {
        // Opening the device can block
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.play_sync())
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(format!("Task join error: {}", e)))?
    }

    async fn pause(&self) -> Result<(), PlaybackError> {
        self.inner.pause_sync()
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        self.inner.stop_sync()
    }

    fn is_finished(&self) -> bool {
        self.inner.finished()
    }
}
