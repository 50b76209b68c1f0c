//! Interactive recording session runner

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::application::ports::{AudioCapture, DocumentStore, IdentityProvider};
use crate::application::{RecordingSessionManager, SessionConfig, SessionError, SessionSnapshot};
use crate::domain::config::AppConfig;
use crate::domain::recording::EntryId;
use crate::domain::session::{CaptureState, PlaybackState};
use crate::infrastructure::{CpalCapture, RodioPlayer};

use super::app::{build_identity, build_store, CommandError};
use super::presenter::Presenter;
use super::session_cmd::SessionCommand;
use super::signals::shutdown_requested;

/// Run the interactive session until quit, end of input, or Ctrl+C
pub async fn run_session(
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    // Without an API key the session runs signed out
    let identity = match build_identity(config) {
        Ok(provider) => {
            provider.restore().await;
            Some(provider)
        }
        Err(e) => {
            debug!(error = %e, "no identity provider");
            None
        }
    };

    let store = build_store(config, identity.as_ref())?;
    let capture = CpalCapture::new(config.recordings_dir_or_default(), RodioPlayer::new());
    let session_config = SessionConfig {
        collection: config.collection_or_default().to_string(),
        quality: config.quality_or_default(),
    };
    let mut manager = RecordingSessionManager::new(capture, store, session_config);

    let signed_in = identity.as_ref().and_then(|provider| provider.current());
    presenter.session_header(
        signed_in.as_ref(),
        config.quality_or_default().as_str(),
        config.store_or_default().as_str(),
    );
    let mut snapshots = manager.subscribe();
    presenter.render_snapshot(&manager.snapshot());
    snapshots.mark_unchanged();

    let mut lines = spawn_stdin_reader()?;
    let shutdown = shutdown_requested();
    tokio::pin!(shutdown);
    let mut signals_armed = true;

    loop {
        presenter.prompt();

        let line = tokio::select! {
            line = lines.recv() => line,
            result = &mut shutdown, if signals_armed => {
                match result {
                    Ok(()) => {
                        presenter.output("");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to install signal handler");
                        signals_armed = false;
                        continue;
                    }
                }
            }
        };

        // End of input
        let Some(line) = line else {
            presenter.output("");
            break;
        };

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                presenter.error(&format!("Failed to read input: {}", e));
                break;
            }
        };

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                presenter.warn(&e.to_string());
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }

        // Keep a long session's sign-in usable for store calls
        if let Some(provider) = &identity {
            provider.ensure_fresh().await;
        }
        manager.refresh_playback();

        let always_render = command == SessionCommand::List;
        if !handle_command(&mut manager, &snapshots, command, presenter).await {
            continue;
        }
        if always_render || snapshots.has_changed().unwrap_or(false) {
            presenter.render_snapshot(&snapshots.borrow_and_update());
        }
    }

    manager.teardown().await;
    presenter.info("Session ended");
    Ok(())
}

/// Read stdin lines on a detached thread so a pending read never holds up
/// runtime shutdown
fn spawn_stdin_reader() -> Result<mpsc::Receiver<std::io::Result<String>>, CommandError> {
    let (tx, rx) = mpsc::channel(8);

    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;

    Ok(rx)
}

/// Run one command. Returns whether the session view may need redrawing.
async fn handle_command<C, S>(
    manager: &mut RecordingSessionManager<C, S>,
    snapshots: &watch::Receiver<SessionSnapshot>,
    command: SessionCommand,
    presenter: &mut Presenter,
) -> bool
where
    C: AudioCapture,
    S: DocumentStore,
{
    match command {
        SessionCommand::Record => toggle_recording(manager, presenter).await,
        SessionCommand::Play(number) => {
            let id = snapshots.borrow().id_at(number);
            toggle_playback(manager, id, number, presenter).await
        }
        SessionCommand::Clear => clear(manager, snapshots, presenter).await,
        SessionCommand::Retry => retry(manager, snapshots, presenter).await,
        SessionCommand::List => {}
        SessionCommand::Help => {
            presenter.help();
            return false;
        }
        SessionCommand::Quit => return false,
    }
    true
}

/// How a recording is named in messages: its row number when it is listed
fn row_label(snapshot: &SessionSnapshot, id: EntryId) -> String {
    match snapshot.row_of(id) {
        Some(row) => format!("#{}", row),
        None => id.to_string(),
    }
}

async fn toggle_recording<C, S>(
    manager: &mut RecordingSessionManager<C, S>,
    presenter: &mut Presenter,
) where
    C: AudioCapture,
    S: DocumentStore,
{
    match manager.capture_state() {
        CaptureState::Idle => match manager.start_capture().await {
            Ok(()) => presenter.info("Recording... type 'r' to stop"),
            Err(SessionError::PermissionDenied) => {
                presenter.warn("Permission to access the microphone is required")
            }
            Err(e) => presenter.error(&e.to_string()),
        },
        CaptureState::Recording => {
            presenter.start_spinner("Saving recording...");
            match manager.stop_capture().await {
                Ok(_) => presenter.spinner_success("Recording saved"),
                Err(e @ SessionError::Upload { .. }) => {
                    presenter.spinner_fail(&e.to_string());
                    presenter.info("Type 'retry' to sync it again");
                }
                Err(e) => presenter.spinner_fail(&e.to_string()),
            }
        }
        CaptureState::Uploading => presenter.warn("Still saving the last recording"),
    }
}

async fn toggle_playback<C, S>(
    manager: &mut RecordingSessionManager<C, S>,
    id: Option<EntryId>,
    number: usize,
    presenter: &Presenter,
) where
    C: AudioCapture,
    S: DocumentStore,
{
    let Some(id) = id else {
        presenter.warn(&format!("There is no recording #{}", number));
        return;
    };

    match manager.toggle_playback(id).await {
        Ok(PlaybackState::Playing) => presenter.info(&format!("Playing recording #{}", number)),
        Ok(_) => presenter.info(&format!("Paused recording #{}", number)),
        Err(e) => presenter.error(&e.to_string()),
    }
}

async fn clear<C, S>(
    manager: &mut RecordingSessionManager<C, S>,
    snapshots: &watch::Receiver<SessionSnapshot>,
    presenter: &mut Presenter,
) where
    C: AudioCapture,
    S: DocumentStore,
{
    if !snapshots.borrow().can_clear() {
        presenter.info("Nothing to clear");
        return;
    }

    presenter.start_spinner("Deleting recordings...");
    match manager.clear_all().await {
        Ok(count) => presenter.spinner_success(&format!("Deleted {} recordings", count)),
        Err(SessionError::ClearIncomplete { failures, total }) => {
            presenter.spinner_fail(&format!(
                "Failed to delete {} of {} recordings",
                failures.len(),
                total
            ));
            // Failed entries stay listed; name them by their new rows
            let snapshot = snapshots.borrow().clone();
            for failure in failures {
                presenter.warn(&format!(
                    "Recording {}: {}",
                    row_label(&snapshot, failure.entry),
                    failure.error
                ));
            }
        }
        Err(e) => presenter.spinner_fail(&e.to_string()),
    }
}

async fn retry<C, S>(
    manager: &mut RecordingSessionManager<C, S>,
    snapshots: &watch::Receiver<SessionSnapshot>,
    presenter: &mut Presenter,
) where
    C: AudioCapture,
    S: DocumentStore,
{
    if manager.unsynced_count() == 0 {
        presenter.info("Everything is synced");
        return;
    }

    presenter.start_spinner("Syncing recordings...");
    let report = manager.retry_unsynced().await;

    if report.failed.is_empty() {
        presenter.spinner_success(&format!("Synced {} recordings", report.synced.len()));
    } else {
        presenter.spinner_fail(&format!(
            "Synced {}, {} still failing",
            report.synced.len(),
            report.failed.len()
        ));
        let snapshot = snapshots.borrow().clone();
        for (id, error) in report.failed {
            presenter.warn(&format!("Recording {}: {}", row_label(&snapshot, id), error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::EntryView;
    use crate::domain::recording::RemoteId;

    fn listed(ids: &[u64]) -> SessionSnapshot {
        SessionSnapshot {
            entries: ids
                .iter()
                .map(|&n| EntryView {
                    id: EntryId::new(n),
                    duration_label: "0:01".to_string(),
                    source_locator: format!("file:///tmp/{}.flac", n),
                    remote_id: RemoteId::new(format!("doc-{}", n)).unwrap(),
                    playback: PlaybackState::Stopped,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn failures_are_named_by_row() {
        // Entry ids 4 and 9 are shown as rows 1 and 2
        let snapshot = listed(&[4, 9]);
        assert_eq!(row_label(&snapshot, EntryId::new(9)), "#2");
        assert_eq!(row_label(&snapshot, EntryId::new(4)), "#1");
    }

    #[test]
    fn unlisted_recording_falls_back_to_id() {
        let snapshot = listed(&[4]);
        assert_eq!(row_label(&snapshot, EntryId::new(5)), EntryId::new(5).to_string());
    }
}
