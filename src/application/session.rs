//! Recording session use case
//!
//! Owns at most one in-progress capture, the ordered list of finished
//! recordings (each paired with a remote metadata record) and at most one
//! active playback. All mutation goes through `&mut self`, so callers
//! serialise operations the way a UI event loop does.

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::config::DEFAULT_COLLECTION;
use crate::domain::recording::{
    DurationLabel, EntryId, QualityPreset, RecordingMetadata, RemoteId,
};
use crate::domain::session::{
    CaptureLifecycle, CaptureState, InvalidStateTransition, PlaybackState, PlaybackTracker,
};

use super::ports::{
    AudioCapture, CaptureError, CaptureHandle, CaptureMode, DocumentStore, Permission,
    PlayableAudio, PlaybackError, StoreError,
};

/// Errors from the recording session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Microphone permission was denied")]
    PermissionDenied,

    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Recording {entry} was kept locally but its upload failed: {source}")]
    Upload {
        entry: EntryId,
        #[source]
        source: StoreError,
    },

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("No recording with id {0}")]
    UnknownEntry(EntryId),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Failed to delete {} of {total} recordings", .failures.len())]
    ClearIncomplete {
        failures: Vec<DeleteFailure>,
        total: usize,
    },
}

/// A remote delete that failed during `clear_all`
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    pub entry: EntryId,
    pub remote_id: RemoteId,
    pub error: StoreError,
}

/// Outcome of retrying unsynced uploads
#[derive(Debug, Default)]
pub struct RetryReport {
    pub synced: Vec<EntryId>,
    pub failed: Vec<(EntryId, StoreError)>,
}

/// Settings for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote collection metadata records are written to
    pub collection: String,
    pub quality: QualityPreset,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            quality: QualityPreset::default(),
        }
    }
}

/// A synced recording as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub id: EntryId,
    pub duration_label: String,
    pub source_locator: String,
    pub remote_id: RemoteId,
    pub playback: PlaybackState,
}

/// A recording whose metadata upload has not succeeded yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsyncedView {
    pub id: EntryId,
    pub duration_label: String,
    pub source_locator: String,
    pub last_error: String,
    pub playback: PlaybackState,
}

/// Read-only picture of the session, published after every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub capture: CaptureState,
    pub entries: Vec<EntryView>,
    pub unsynced: Vec<UnsyncedView>,
}

impl SessionSnapshot {
    /// Resolve a 1-based row number. Synced recordings come first, then
    /// unsynced ones.
    pub fn id_at(&self, number: usize) -> Option<EntryId> {
        let index = number.checked_sub(1)?;
        match self.entries.get(index) {
            Some(entry) => Some(entry.id),
            None => self
                .unsynced
                .get(index - self.entries.len())
                .map(|pending| pending.id),
        }
    }

    /// 1-based row number of a recording, the inverse of `id_at`
    pub fn row_of(&self, id: EntryId) -> Option<usize> {
        self.entries
            .iter()
            .map(|entry| entry.id)
            .chain(self.unsynced.iter().map(|pending| pending.id))
            .position(|candidate| candidate == id)
            .map(|index| index + 1)
    }

    /// Whether there is anything to clear
    pub fn can_clear(&self) -> bool {
        !self.entries.is_empty() || !self.unsynced.is_empty()
    }
}

struct RecordingEntry {
    id: EntryId,
    audio: Box<dyn PlayableAudio>,
    duration_label: DurationLabel,
    source_locator: String,
    remote_id: RemoteId,
}

struct UnsyncedRecording {
    id: EntryId,
    audio: Box<dyn PlayableAudio>,
    duration_label: DurationLabel,
    source_locator: String,
    last_error: StoreError,
}

impl UnsyncedRecording {
    fn metadata(&self) -> RecordingMetadata {
        RecordingMetadata::new(&self.duration_label, self.source_locator.clone())
    }

    fn into_entry(self, remote_id: RemoteId) -> RecordingEntry {
        RecordingEntry {
            id: self.id,
            audio: self.audio,
            duration_label: self.duration_label,
            source_locator: self.source_locator,
            remote_id,
        }
    }
}

/// Recording session manager
pub struct RecordingSessionManager<C, S>
where
    C: AudioCapture,
    S: DocumentStore,
{
    capture: C,
    store: S,
    config: SessionConfig,
    lifecycle: CaptureLifecycle,
    active_capture: Option<Box<dyn CaptureHandle>>,
    entries: Vec<RecordingEntry>,
    unsynced: Vec<UnsyncedRecording>,
    playback: PlaybackTracker,
    next_id: u64,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl<C, S> RecordingSessionManager<C, S>
where
    C: AudioCapture,
    S: DocumentStore,
{
    /// Create an empty session
    pub fn new(capture: C, store: S, config: SessionConfig) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::default());
        Self {
            capture,
            store,
            config,
            lifecycle: CaptureLifecycle::new(),
            active_capture: None,
            entries: Vec::new(),
            unsynced: Vec::new(),
            playback: PlaybackTracker::new(),
            next_id: 1,
            snapshots,
        }
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.lifecycle.state()
    }

    pub fn playback_state(&self, id: EntryId) -> PlaybackState {
        self.playback.state_of(id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn unsynced_count(&self) -> usize {
        self.unsynced.len()
    }

    /// Build a snapshot of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            capture: self.lifecycle.state(),
            entries: self
                .entries
                .iter()
                .map(|entry| EntryView {
                    id: entry.id,
                    duration_label: entry.duration_label.to_string(),
                    source_locator: entry.source_locator.clone(),
                    remote_id: entry.remote_id.clone(),
                    playback: self.playback.state_of(entry.id),
                })
                .collect(),
            unsynced: self
                .unsynced
                .iter()
                .map(|pending| UnsyncedView {
                    id: pending.id,
                    duration_label: pending.duration_label.to_string(),
                    source_locator: pending.source_locator.clone(),
                    last_error: pending.last_error.to_string(),
                    playback: self.playback.state_of(pending.id),
                })
                .collect(),
        }
    }

    /// Start capturing.
    ///
    /// Stops any active playback first. A denied permission leaves the
    /// session idle.
    pub async fn start_capture(&mut self) -> Result<(), SessionError> {
        self.lifecycle.ensure_idle("start recording")?;
        self.stop_active_playback().await;

        if self.capture.request_permission().await? == Permission::Denied {
            warn!("microphone permission denied");
            return Err(SessionError::PermissionDenied);
        }

        self.capture.configure_mode(CaptureMode::recording()).await?;
        let handle = self.capture.begin(self.config.quality).await?;
        self.lifecycle.begin()?;

        info!(locator = handle.locator(), quality = %self.config.quality, "capture started");
        self.active_capture = Some(handle);
        self.publish();
        Ok(())
    }

    /// Stop capturing, upload the metadata record and append the recording.
    ///
    /// If the upload fails the recording is kept as unsynced and
    /// `SessionError::Upload` is returned.
    pub async fn stop_capture(&mut self) -> Result<EntryId, SessionError> {
        self.lifecycle.finish()?;
        let Some(handle) = self.active_capture.take() else {
            self.lifecycle.settle()?;
            return Err(InvalidStateTransition {
                current_state: CaptureState::Idle,
                action: "stop recording".to_string(),
            }
            .into());
        };
        self.publish();

        let locator = handle.locator().to_string();
        let finished = match handle.finalize().await {
            Ok(finished) => finished,
            Err(e) => {
                warn!(error = %e, "failed to finalize capture");
                self.lifecycle.settle()?;
                self.publish();
                return Err(e.into());
            }
        };

        let id = self.allocate_id();
        let duration_label = DurationLabel::from_millis(finished.duration_ms);
        let record = RecordingMetadata::new(&duration_label, locator.clone());
        let uploaded = self.store.create(&self.config.collection, &record).await;
        self.lifecycle.settle()?;

        let result = match uploaded {
            Ok(remote_id) => {
                info!(entry = %id, remote_id = %remote_id, duration = %duration_label, "recording saved");
                self.entries.push(RecordingEntry {
                    id,
                    audio: finished.audio,
                    duration_label,
                    source_locator: locator,
                    remote_id,
                });
                Ok(id)
            }
            Err(e) => {
                warn!(entry = %id, error = %e, "metadata upload failed, keeping recording locally");
                self.unsynced.push(UnsyncedRecording {
                    id,
                    audio: finished.audio,
                    duration_label,
                    source_locator: locator,
                    last_error: e.clone(),
                });
                Err(SessionError::Upload {
                    entry: id,
                    source: e,
                })
            }
        };

        self.publish();
        result
    }

    /// Mark a recording that played to its end as stopped.
    ///
    /// Call before rendering so the UI never offers "Pause" for audio that
    /// is no longer playing.
    pub fn refresh_playback(&mut self) {
        if self.settle_finished_playback() {
            self.publish();
        }
    }

    /// Play the recording, or pause it if it is the one playing.
    ///
    /// A recording that played to its end counts as stopped and starts over.
    /// Starting a recording stops whichever other recording was active.
    /// Returns the recording's new playback state.
    pub async fn toggle_playback(&mut self, id: EntryId) -> Result<PlaybackState, SessionError> {
        self.audio(id)?;
        self.settle_finished_playback();

        if self.playback.state_of(id) == PlaybackState::Playing {
            self.audio(id)?.pause().await?;
            self.playback.set_paused(id);
            debug!(entry = %id, "playback paused");
        } else {
            if let Some((active, _)) = self.playback.active() {
                if active != id {
                    self.audio(active)?.stop().await?;
                    self.playback.set_stopped(active);
                    debug!(entry = %active, "playback stopped");
                }
            }
            self.audio(id)?.play().await?;
            self.playback.set_playing(id);
            debug!(entry = %id, "playback started");
        }

        self.publish();
        Ok(self.playback.state_of(id))
    }

    /// Delete every remote record and empty the list.
    ///
    /// Deletes run one at a time and continue past failures. Recordings whose
    /// delete failed stay in the list and are reported in
    /// `SessionError::ClearIncomplete`. Returns the number deleted.
    pub async fn clear_all(&mut self) -> Result<usize, SessionError> {
        self.stop_active_playback().await;
        self.playback.reset();

        let entries = std::mem::take(&mut self.entries);
        let total = entries.len();
        let mut failures = Vec::new();

        for entry in entries {
            match self
                .store
                .delete(&self.config.collection, &entry.remote_id)
                .await
            {
                Ok(()) => debug!(entry = %entry.id, remote_id = %entry.remote_id, "remote record deleted"),
                Err(e) => {
                    warn!(entry = %entry.id, remote_id = %entry.remote_id, error = %e, "failed to delete remote record");
                    failures.push(DeleteFailure {
                        entry: entry.id,
                        remote_id: entry.remote_id.clone(),
                        error: e,
                    });
                    self.entries.push(entry);
                }
            }
        }

        if !self.unsynced.is_empty() {
            info!(count = self.unsynced.len(), "discarding unsynced recordings");
            self.unsynced.clear();
        }

        self.publish();

        if failures.is_empty() {
            info!(count = total, "recordings cleared");
            Ok(total)
        } else {
            Err(SessionError::ClearIncomplete { failures, total })
        }
    }

    /// Retry the metadata upload of every unsynced recording, once each.
    ///
    /// Synced recordings join the list in stop-time order.
    pub async fn retry_unsynced(&mut self) -> RetryReport {
        let mut report = RetryReport::default();

        for mut pending in std::mem::take(&mut self.unsynced) {
            match self
                .store
                .create(&self.config.collection, &pending.metadata())
                .await
            {
                Ok(remote_id) => {
                    info!(entry = %pending.id, remote_id = %remote_id, "unsynced recording uploaded");
                    report.synced.push(pending.id);
                    let entry = pending.into_entry(remote_id);
                    let position = self.entries.partition_point(|e| e.id < entry.id);
                    self.entries.insert(position, entry);
                }
                Err(e) => {
                    warn!(entry = %pending.id, error = %e, "retry upload failed");
                    report.failed.push((pending.id, e.clone()));
                    pending.last_error = e;
                    self.unsynced.push(pending);
                }
            }
        }

        self.publish();
        report
    }

    /// Release every capture and playback resource.
    ///
    /// Called when the session ends. Remote records are left in place.
    pub async fn teardown(&mut self) {
        self.stop_active_playback().await;

        if let Some(handle) = self.active_capture.take() {
            if let Err(e) = handle.discard().await {
                warn!(error = %e, "failed to discard capture");
            }
            if self.lifecycle.is_recording() {
                if let Err(e) = self.lifecycle.abandon() {
                    warn!(error = %e, "failed to reset capture state");
                }
            }
        }

        self.entries.clear();
        self.unsynced.clear();
        self.playback.reset();
        self.publish();
        debug!("session torn down");
    }

    fn audio(&self, id: EntryId) -> Result<&dyn PlayableAudio, SessionError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.audio.as_ref())
            .or_else(|| {
                self.unsynced
                    .iter()
                    .find(|pending| pending.id == id)
                    .map(|pending| pending.audio.as_ref())
            })
            .ok_or(SessionError::UnknownEntry(id))
    }

    fn settle_finished_playback(&mut self) -> bool {
        let Some((id, PlaybackState::Playing)) = self.playback.active() else {
            return false;
        };

        let finished = self.audio(id).is_ok_and(|audio| audio.is_finished());
        if finished {
            self.playback.set_stopped(id);
            debug!(entry = %id, "playback reached the end");
        }
        finished
    }

    async fn stop_active_playback(&mut self) {
        let Some((id, _)) = self.playback.active() else {
            return;
        };

        if let Ok(audio) = self.audio(id) {
            if let Err(e) = audio.stop().await {
                warn!(entry = %id, error = %e, "failed to stop playback");
            }
        }
        self.playback.set_stopped(id);
        self.publish();
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
