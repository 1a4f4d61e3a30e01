//! Working area for derived run artifacts.
//!
//! Everything a run produces before the final artifact (normalized track,
//! chunks, synthesized chunks, dubbed track) lives under one directory that is
//! wiped at the start of every run. Acquiring it also marks a run as active.

use crate::error::{RedubError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Sub-directory of the configured work dir that is reset per run.
const RUN_DIR: &str = "run";

/// Owner of the working area.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    active: Arc<AtomicBool>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Directory reset by each run.
    pub fn run_dir(&self) -> PathBuf {
        self.root.join(RUN_DIR)
    }

    /// Whether a guard is currently held.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark a run active and reset the working area.
    ///
    /// Fails with `RunAlreadyInProgress` without touching anything if a guard
    /// is already held. Resetting twice leaves the same empty layout.
    pub fn acquire(&self) -> Result<WorkspaceGuard> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RedubError::RunAlreadyInProgress);
        }
        let guard = WorkspaceGuard {
            dir: self.run_dir(),
            active: Arc::clone(&self.active),
            keep: true,
        };
        guard.reset()?;
        Ok(guard)
    }
}

/// Exclusive access to a freshly reset working area.
///
/// Dropping the guard releases the run-active flag, on success, error or
/// panic alike.
#[derive(Debug)]
pub struct WorkspaceGuard {
    dir: PathBuf,
    active: Arc<AtomicBool>,
    keep: bool,
}

impl WorkspaceGuard {
    fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("cleared working area {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(self.chunks_dir())?;
        fs::create_dir_all(self.dubbed_dir())?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalized mono 16 kHz track extracted from the source.
    pub fn audio_track(&self) -> PathBuf {
        self.dir.join("audio.wav")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.dir.join("chunks")
    }

    pub fn dubbed_dir(&self) -> PathBuf {
        self.dir.join("dubbed")
    }

    /// Concatenated dubbed audio.
    pub fn dubbed_track(&self) -> PathBuf {
        self.dir.join("dubbed_track.wav")
    }

    /// Remove the working area contents when the guard drops.
    pub fn discard_on_drop(&mut self) {
        self.keep = false;
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if !self.keep
            && let Err(e) = fs::remove_dir_all(&self.dir)
        {
            warn!("failed to remove working area {}: {e}", self.dir.display());
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn acquire_creates_layout() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path());

        let guard = workspace.acquire().unwrap();

        assert!(guard.chunks_dir().is_dir());
        assert!(guard.dubbed_dir().is_dir());
        assert_eq!(entries(guard.dir()), vec!["chunks", "dubbed"]);
        assert!(workspace.is_active());
    }

    #[test]
    fn acquire_discards_previous_run() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path());

        {
            let guard = workspace.acquire().unwrap();
            fs::write(guard.audio_track(), b"stale").unwrap();
            fs::write(guard.chunks_dir().join("chunk_00000.wav"), b"stale").unwrap();
        }

        let guard = workspace.acquire().unwrap();
        assert!(!guard.audio_track().exists());
        assert!(entries(&guard.chunks_dir()).is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path());

        let first = {
            let guard = workspace.acquire().unwrap();
            entries(guard.dir())
        };
        let second = {
            let guard = workspace.acquire().unwrap();
            entries(guard.dir())
        };
        assert_eq!(first, second);
    }

    #[test]
    fn second_acquire_is_rejected_while_active() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path());

        let guard = workspace.acquire().unwrap();
        fs::write(guard.audio_track(), b"in progress").unwrap();

        assert!(matches!(
            workspace.acquire(),
            Err(RedubError::RunAlreadyInProgress)
        ));
        // the active run's files are untouched
        assert!(guard.audio_track().exists());

        drop(guard);
        assert!(!workspace.is_active());
        assert!(workspace.acquire().is_ok());
    }

    #[test]
    fn discard_on_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path());

        let mut guard = workspace.acquire().unwrap();
        guard.discard_on_drop();
        drop(guard);

        assert!(!workspace.run_dir().exists());
        assert!(root.path().exists());
    }

    #[test]
    fn flag_released_after_failed_reset() {
        let root = tempfile::tempdir().unwrap();
        // a file where the run directory must go makes the reset fail
        fs::write(root.path().join(RUN_DIR), b"not a dir").unwrap();
        let workspace = Workspace::new(root.path());

        assert!(workspace.acquire().is_err());
        assert!(!workspace.is_active());
    }
}
