//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{SessionSnapshot, UnsyncedView};
use crate::domain::auth::Identity;
use crate::domain::session::{CaptureState, PlaybackState};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn status(&self, symbol: ColoredString, message: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{} {}", symbol, message)),
            None => eprintln!("{} {}", symbol, message),
        }
    }

    pub fn info(&self, message: &str) {
        self.status("ℹ".cyan(), message);
    }

    pub fn success(&self, message: &str) {
        self.status("✓".green(), message);
    }

    pub fn warn(&self, message: &str) {
        self.status("⚠".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        self.status("✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print the input prompt
    pub fn prompt(&self) {
        print!("{} ", "›".cyan());
        let _ = io::stdout().flush();
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Session banner with the signed-in account, if any
    pub fn session_header(&self, identity: Option<&Identity>, quality: &str, store: &str) {
        println!("{}", "Voice Memos".bold());
        match identity {
            Some(identity) => println!("Signed in as {}", identity.email.cyan()),
            None => println!("{}", "Not signed in".dimmed()),
        }
        println!("{}", format!("quality: {} | store: {}", quality, store).dimmed());
    }

    /// Render the recordings list and the available actions
    pub fn render_snapshot(&self, snapshot: &SessionSnapshot) {
        if !snapshot.can_clear() {
            println!("{}", "No recordings yet".dimmed());
        }

        let mut number = 0;
        for entry in &snapshot.entries {
            number += 1;
            println!(
                "{}",
                format_entry_row(number, &entry.duration_label, entry.playback)
            );
        }
        for pending in &snapshot.unsynced {
            number += 1;
            println!("{}", format_unsynced_row(number, pending));
        }

        let mut actions = vec![format!("[r] {}", record_button_label(snapshot.capture))];
        if snapshot.can_clear() {
            actions.push("[c] Clear Recordings".to_string());
        }
        if !snapshot.unsynced.is_empty() {
            actions.push("[retry] Sync".to_string());
        }
        actions.push("[h] Help".to_string());
        println!("{}", actions.join("  ").cyan());
    }

    /// Print the session commands
    pub fn help(&self) {
        for (command, description) in SESSION_HELP {
            println!("  {:<12} {}", command.cyan(), description);
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

const SESSION_HELP: &[(&str, &str)] = &[
    ("r, record", "Start recording, or stop and save the current one"),
    ("p N, play N", "Play or pause recording N"),
    ("c, clear", "Delete every recording"),
    ("retry", "Sync recordings whose upload failed"),
    ("l, list", "Show the recordings"),
    ("h, help", "Show this help"),
    ("q, quit", "Leave the session"),
];

/// Label of the single record button
pub fn record_button_label(state: CaptureState) -> &'static str {
    match state {
        CaptureState::Idle => "Start Recording",
        CaptureState::Recording => "Stop Recording",
        CaptureState::Uploading => "Saving...",
    }
}

/// Label of a row's play control
pub fn play_button_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Pause",
        PlaybackState::Paused | PlaybackState::Stopped => "Play",
    }
}

/// `Recording #N | M:SS` row with its play control
pub fn format_entry_row(number: usize, duration_label: &str, playback: PlaybackState) -> String {
    let row = format!(
        "{:>3}. Recording #{} | {}  [{}]",
        number,
        number,
        duration_label,
        play_button_label(playback)
    );
    if playback == PlaybackState::Playing {
        row.green().to_string()
    } else {
        row
    }
}

fn format_unsynced_row(number: usize, pending: &UnsyncedView) -> String {
    format!(
        "{} {}",
        format_entry_row(number, &pending.duration_label, pending.playback),
        format!("(not synced: {})", pending.last_error).yellow()
    )
}
