//! Progress observers for a dubbing run.

use crate::pipeline::status::RunSnapshot;
use std::sync::Mutex;

/// Receives every snapshot the orchestrator publishes.
pub trait ProgressSink: Send + Sync {
    fn update(&self, snapshot: &RunSnapshot);
}

/// Ignores all updates.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _snapshot: &RunSnapshot) {}
}

/// Records every update, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    snapshots: Mutex<Vec<RunSnapshot>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<RunSnapshot> {
        self.snapshots.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn update(&self, snapshot: &RunSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(snapshot.clone());
        }
    }
}

#[cfg(feature = "cli")]
pub use terminal::TerminalProgress;

#[cfg(feature = "cli")]
mod terminal {
    use super::ProgressSink;
    use crate::pipeline::status::{RunSnapshot, RunStatus};
    use indicatif::{ProgressBar, ProgressStyle};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Spinner per stage, percentage bar while chunks are dubbed.
    #[derive(Default)]
    pub struct TerminalProgress {
        pub(super) current: Mutex<Option<(RunStatus, ProgressBar)>>,
    }

    impl TerminalProgress {
        pub fn new() -> Self {
            Self::default()
        }

        fn start(status: RunStatus) -> ProgressBar {
            let bar = if status == RunStatus::Transcribing {
                let bar = ProgressBar::new(100);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos:>3}% {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
                );
                bar
            } else {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            };
            bar.set_prefix(status.label());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        }
    }

    impl ProgressSink for TerminalProgress {
        fn update(&self, snapshot: &RunSnapshot) {
            let Ok(mut current) = self.current.lock() else {
                return;
            };

            if snapshot.status.is_finished() {
                if let Some((_, bar)) = current.take() {
                    bar.finish_and_clear();
                }
                return;
            }

            let stale = current
                .as_ref()
                .is_none_or(|(status, _)| *status != snapshot.status);
            if stale {
                if let Some((_, bar)) = current.take() {
                    bar.finish_and_clear();
                }
                *current = Some((snapshot.status, Self::start(snapshot.status)));
            }

            if let Some((_, bar)) = current.as_ref() {
                bar.set_position(u64::from(snapshot.percent));
                bar.set_message(snapshot.detail.clone());
            }
        }
    }
}
