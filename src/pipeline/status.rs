//! Run state machine and the observable snapshot.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Stage of a dubbing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Preparing,
    Extracting,
    Segmenting,
    Transcribing,
    Concatenating,
    Muxing,
    Done,
    Failed,
}

impl RunStatus {
    /// Whether `self -> next` is a legal transition.
    ///
    /// Stages only move forward one step. Any working stage may fail, and a
    /// finished run (done or failed) may start over.
    pub fn can_advance_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        match (self, next) {
            (Idle | Done | Failed, Preparing) => true,
            (Preparing, Extracting)
            | (Extracting, Segmenting)
            | (Segmenting, Transcribing)
            | (Transcribing, Concatenating)
            | (Concatenating, Muxing)
            | (Muxing, Done) => true,
            (from, Failed) => from.is_working(),
            _ => false,
        }
    }

    /// A run is in one of the working stages.
    pub fn is_working(self) -> bool {
        !matches!(self, RunStatus::Idle | RunStatus::Done | RunStatus::Failed)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Preparing => "preparing",
            RunStatus::Extracting => "extracting audio",
            RunStatus::Segmenting => "segmenting",
            RunStatus::Transcribing => "dubbing chunks",
            RunStatus::Concatenating => "concatenating",
            RunStatus::Muxing => "muxing",
            RunStatus::Done => "done",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time view of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub status: RunStatus,
    /// Stage that failed, set only when `status` is `Failed`.
    pub failed_stage: Option<RunStatus>,
    pub detail: String,
    /// 0..=100, monotonic within a stage.
    pub percent: u8,
    /// Final artifact, set only when `status` is `Done`.
    pub artifact: Option<PathBuf>,
    pub error: Option<String>,
}

impl Default for RunSnapshot {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            failed_stage: None,
            detail: String::new(),
            percent: 0,
            artifact: None,
            error: None,
        }
    }
}

/// Percentage of `done` out of `total`, rounded down.
pub fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use RunStatus::*;

    const ALL: [RunStatus; 9] = [
        Idle,
        Preparing,
        Extracting,
        Segmenting,
        Transcribing,
        Concatenating,
        Muxing,
        Done,
        Failed,
    ];

    #[test]
    fn happy_path_is_legal() {
        let path = [
            Idle,
            Preparing,
            Extracting,
            Segmenting,
            Transcribing,
            Concatenating,
            Muxing,
            Done,
            Preparing,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn no_backward_or_skipping_moves() {
        assert!(!Transcribing.can_advance_to(Segmenting));
        assert!(!Extracting.can_advance_to(Transcribing));
        assert!(!Idle.can_advance_to(Extracting));
        assert!(!Done.can_advance_to(Muxing));
        assert!(!Muxing.can_advance_to(Preparing));
    }

    #[test]
    fn only_working_stages_can_fail() {
        for status in ALL {
            assert_eq!(status.can_advance_to(Failed), status.is_working(), "{status:?}");
        }
        assert!(Failed.can_advance_to(Preparing));
    }

    #[test]
    fn percent_of_rounds_down_and_caps() {
        assert_eq!(percent_of(0, 3), 0);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(3, 3), 100);
        assert_eq!(percent_of(5, 3), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn snapshot_serializes_snake_case_status() {
        let snapshot = RunSnapshot {
            status: Transcribing,
            percent: 40,
            ..Default::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "transcribing");
        assert_eq!(json["percent"], 40);
        assert!(json["artifact"].is_null());
    }
}
