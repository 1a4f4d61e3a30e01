//! Dubbing run orchestration.
//!
//! Drives one run through extract → segment → budget → dub chunks →
//! assemble → remux, publishing a [`RunSnapshot`] at every step. Any error
//! aborts the run and leaves it `Failed`.

use crate::error::{RedubError, Result};
use crate::media::{FinalArtifact, SourceMedia, Transcoder};
use crate::pipeline::assembler::assemble;
use crate::pipeline::budget::apply_budget;
use crate::pipeline::dubbing::DubbingStage;
use crate::pipeline::progress::{NoProgress, ProgressSink};
use crate::pipeline::segmenter::Segmenter;
use crate::pipeline::status::{RunSnapshot, RunStatus, percent_of};
use crate::pipeline::types::{AudioChunk, SynthesizedChunk};
use crate::pipeline::workspace::{Workspace, WorkspaceGuard};
use futures_util::{StreamExt, stream};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// What to dub and where to put it.
#[derive(Debug, Clone)]
pub struct DubRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Upper bound on dubbed source minutes (clamped to the supported range).
    pub max_minutes: u32,
}

/// Runs dubbing jobs one at a time over a shared working area.
pub struct Dubber {
    transcoder: Arc<dyn Transcoder>,
    stage: DubbingStage,
    workspace: Workspace,
    segmenter: Segmenter,
    parallel_chunks: usize,
    keep_work: bool,
    progress: Arc<dyn ProgressSink>,
    snapshot: Mutex<RunSnapshot>,
}

impl Dubber {
    pub fn new(transcoder: Arc<dyn Transcoder>, stage: DubbingStage, workspace: Workspace) -> Self {
        Self {
            transcoder,
            stage,
            workspace,
            segmenter: Segmenter::default(),
            parallel_chunks: 1,
            keep_work: false,
            progress: Arc::new(NoProgress),
            snapshot: Mutex::new(RunSnapshot::default()),
        }
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Number of chunks dubbed concurrently. 1 (the default) is strictly sequential.
    pub fn with_parallel_chunks(mut self, parallel_chunks: usize) -> Self {
        self.parallel_chunks = parallel_chunks.max(1);
        self
    }

    /// Keep the working area after a successful run.
    pub fn with_keep_work(mut self, keep_work: bool) -> Self {
        self.keep_work = keep_work;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Current state of the latest run.
    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshot.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Run the full pipeline for `request`.
    ///
    /// Fails with `RunAlreadyInProgress` while another run holds the working
    /// area; the active run is left untouched. Any other failure to reset the
    /// working area fails the new run in `Preparing`.
    pub async fn run(&self, request: &DubRequest) -> Result<FinalArtifact> {
        let mut guard = match self.workspace.acquire() {
            Ok(guard) => guard,
            Err(e @ RedubError::RunAlreadyInProgress) => return Err(e),
            Err(e) => {
                self.enter(RunStatus::Preparing, request.input.display().to_string());
                self.fail(&e);
                return Err(e);
            }
        };
        self.enter(RunStatus::Preparing, request.input.display().to_string());

        match self.execute(&guard, request).await {
            Ok(artifact) => {
                self.finish(&artifact);
                if !self.keep_work {
                    guard.discard_on_drop();
                }
                Ok(artifact)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn execute(&self, work: &WorkspaceGuard, request: &DubRequest) -> Result<FinalArtifact> {
        let source = SourceMedia::open(&request.input)?;
        fs::create_dir_all(&request.output_dir)?;

        self.enter(RunStatus::Extracting, self.transcoder.name().to_string());
        let track = work.audio_track();
        self.transcoder.extract_audio(&source, &track).await?;

        self.enter(RunStatus::Segmenting, String::new());
        let chunks = self.segmenter.segment(&track, &work.chunks_dir())?;
        let (chunks, dropped) =
            apply_budget(chunks, request.max_minutes, self.segmenter.chunk_duration());
        if dropped > 0 {
            info!(dropped, "chunks past the budget are not dubbed");
        }

        self.enter(RunStatus::Transcribing, format!("0/{} chunks", chunks.len()));
        let dubbed = self.dub_chunks(&chunks, &work.dubbed_dir()).await?;

        self.enter(RunStatus::Concatenating, format!("{} chunks", dubbed.len()));
        let track = assemble(dubbed, &work.dubbed_track())?;

        self.enter(RunStatus::Muxing, source.container().to_string());
        let name = source.container().artifact_name();
        let staged = work.dir().join(&name);
        self.transcoder.remux(&source, &track.path, &staged).await?;
        let dest = request.output_dir.join(&name);
        promote(&staged, &dest)?;

        info!(
            artifact = %dest.display(),
            chunks = track.chunks,
            secs = track.duration.as_secs_f64(),
            "dubbing finished"
        );
        Ok(FinalArtifact {
            path: dest,
            container: source.container(),
        })
    }

    /// Dub chunks with at most `parallel_chunks` in flight.
    ///
    /// Results arrive in chunk order; the first failure in that order aborts
    /// the remaining work.
    async fn dub_chunks(
        &self,
        chunks: &[AudioChunk],
        out_dir: &Path,
    ) -> Result<Vec<SynthesizedChunk>> {
        let total = chunks.len();
        let mut results = stream::iter(chunks)
            .map(|chunk| self.stage.dub(chunk, out_dir))
            .buffered(self.parallel_chunks);

        let mut dubbed = Vec::with_capacity(total);
        while let Some(result) = results.next().await {
            dubbed.push(result?);
            self.set_progress(
                percent_of(dubbed.len(), total),
                format!("{}/{} chunks", dubbed.len(), total),
            );
        }
        Ok(dubbed)
    }

    fn publish(&self, update: impl FnOnce(&mut RunSnapshot)) {
        let snapshot = match self.snapshot.lock() {
            Ok(mut guard) => {
                update(&mut guard);
                guard.clone()
            }
            Err(_) => return,
        };
        self.progress.update(&snapshot);
    }

    fn enter(&self, status: RunStatus, detail: String) {
        self.publish(|s| {
            if !s.status.can_advance_to(status) {
                warn!(from = %s.status, to = %status, "ignoring illegal status transition");
                return;
            }
            *s = RunSnapshot {
                status,
                detail,
                ..RunSnapshot::default()
            };
        });
    }

    fn set_progress(&self, percent: u8, detail: String) {
        self.publish(|s| {
            s.percent = s.percent.max(percent);
            s.detail = detail;
        });
    }

    fn finish(&self, artifact: &FinalArtifact) {
        self.publish(|s| {
            *s = RunSnapshot {
                status: RunStatus::Done,
                detail: artifact.path.display().to_string(),
                percent: 100,
                artifact: Some(artifact.path.clone()),
                ..RunSnapshot::default()
            };
        });
    }

    fn fail(&self, e: &RedubError) {
        debug!("dubbing failed: {e}");
        self.publish(|s| {
            let stage = s.status;
            s.status = RunStatus::Failed;
            s.failed_stage = Some(stage);
            s.error = Some(e.to_string());
            s.artifact = None;
        });
    }
}

/// Move a finished artifact from the working area to `dest`.
///
/// `dest` only ever holds a complete file: across filesystems the artifact is
/// copied next to it first and then renamed over it.
fn promote(staged: &Path, dest: &Path) -> Result<()> {
    if fs::rename(staged, dest).is_ok() {
        return Ok(());
    }
    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let copied = fs::copy(staged, &part).and_then(|_| fs::rename(&part, dest));
    if let Err(e) = copied {
        if let Err(cleanup) = fs::remove_file(&part)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            warn!("failed to remove {}: {cleanup}", part.display());
        }
        return Err(e.into());
    }
    if let Err(e) = fs::remove_file(staged) {
        warn!("failed to remove staged artifact {}: {e}", staged.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::{PcmAudio, pcm16_mono};
    use crate::pipeline::progress::RecordingProgress;
    use crate::services::{MockSpeechToText, MockSynthesizer, MockTranslator};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Writes a fixed tone as the extracted track and copies the dubbed track on remux.
    struct ToneTranscoder {
        seconds: u32,
        level: i32,
    }

    #[async_trait]
    impl Transcoder for ToneTranscoder {
        async fn extract_audio(&self, _source: &SourceMedia, dest: &Path) -> Result<()> {
            PcmAudio {
                spec: pcm16_mono(100),
                samples: vec![self.level; (self.seconds * 100) as usize],
            }
            .write_to(dest)
        }

        async fn remux(&self, _source: &SourceMedia, dubbed: &Path, dest: &Path) -> Result<()> {
            std::fs::copy(dubbed, dest)?;
            Ok(())
        }

        fn name(&self) -> &str {
            "tone"
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        request: DubRequest,
        work: PathBuf,
    }

    fn fixture(extension: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join(format!("talk.{extension}"));
        std::fs::write(&input, b"video").unwrap();
        Fixture {
            request: DubRequest {
                input,
                output_dir: dir.path().join("out"),
                max_minutes: 45,
            },
            work: dir.path().join("work"),
            _dir: dir,
        }
    }

    fn dubber(work: &Path, seconds: u32, level: i32) -> Dubber {
        let stage = DubbingStage::new(
            Arc::new(MockSpeechToText::new()),
            Arc::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new(1000, Duration::from_secs(1))),
            "es",
            "alloy",
        );
        Dubber::new(
            Arc::new(ToneTranscoder { seconds, level }),
            stage,
            Workspace::new(work),
        )
        .with_segmenter(Segmenter::new(Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn successful_run_ends_done_with_artifact() {
        let f = fixture("mp4");
        let progress = Arc::new(RecordingProgress::new());
        let dubber = dubber(&f.work, 150, 500).with_progress(progress.clone());

        let artifact = dubber.run(&f.request).await.unwrap();

        assert_eq!(artifact.path, f.request.output_dir.join("dubbed.mp4"));
        assert!(artifact.path.is_file());
        let snapshot = dubber.snapshot();
        assert_eq!(snapshot.status, RunStatus::Done);
        assert_eq!(snapshot.artifact, Some(artifact.path.clone()));
        assert_eq!(snapshot.percent, 100);

        let mut visited: Vec<_> = progress.snapshots().iter().map(|s| s.status).collect();
        visited.dedup();
        assert_eq!(
            visited,
            vec![
                RunStatus::Preparing,
                RunStatus::Extracting,
                RunStatus::Segmenting,
                RunStatus::Transcribing,
                RunStatus::Concatenating,
                RunStatus::Muxing,
                RunStatus::Done,
            ]
        );
    }

    #[tokio::test]
    async fn working_area_is_removed_unless_kept() {
        let f = fixture("webm");
        let dubber = dubber(&f.work, 10, 500);
        dubber.run(&f.request).await.unwrap();
        assert!(!Workspace::new(&f.work).run_dir().exists());

        let kept = self::dubber(&f.work, 10, 500).with_keep_work(true);
        kept.run(&f.request).await.unwrap();
        assert!(Workspace::new(&f.work).run_dir().join("dubbed_track.wav").is_file());
    }

    #[tokio::test]
    async fn missing_input_fails_in_preparing() {
        let f = fixture("mp4");
        let dubber = dubber(&f.work, 10, 500);
        let request = DubRequest {
            input: f.request.input.with_file_name("missing.mp4"),
            ..f.request.clone()
        };

        let result = dubber.run(&request).await;

        assert!(matches!(result, Err(RedubError::NoInputMedia { .. })));
        let snapshot = dubber.snapshot();
        assert_eq!(snapshot.status, RunStatus::Failed);
        assert_eq!(snapshot.failed_stage, Some(RunStatus::Preparing));
        assert!(snapshot.artifact.is_none());
    }

    #[tokio::test]
    async fn silent_source_fails_in_segmenting() {
        let f = fixture("mp4");
        let dubber = dubber(&f.work, 30, 0);

        let result = dubber.run(&f.request).await;

        assert!(matches!(result, Err(RedubError::NoSegmentsProduced)));
        assert_eq!(dubber.snapshot().failed_stage, Some(RunStatus::Segmenting));
        assert!(!f.request.output_dir.join("dubbed.mp4").exists());
    }

    #[tokio::test]
    async fn unusable_working_area_fails_in_preparing() {
        let f = fixture("mp4");
        let dubber = dubber(&f.work, 10, 500);
        dubber.run(&f.request).await.unwrap();
        assert_eq!(dubber.snapshot().status, RunStatus::Done);

        // a regular file where the work dir should be
        std::fs::remove_dir_all(&f.work).unwrap();
        std::fs::write(&f.work, b"not a directory").unwrap();
        let result = dubber.run(&f.request).await;

        assert!(matches!(result, Err(RedubError::Io(_))));
        let snapshot = dubber.snapshot();
        assert_eq!(snapshot.status, RunStatus::Failed);
        assert_eq!(snapshot.failed_stage, Some(RunStatus::Preparing));
        assert!(snapshot.artifact.is_none());

        std::fs::remove_file(&f.work).unwrap();
        assert!(dubber.run(&f.request).await.is_ok());
    }

    /// Leaves a partial file at the destination and then fails, like an
    /// interrupted ffmpeg mux.
    struct BrokenMuxTranscoder;

    #[async_trait]
    impl Transcoder for BrokenMuxTranscoder {
        async fn extract_audio(&self, source: &SourceMedia, dest: &Path) -> Result<()> {
            ToneTranscoder {
                seconds: 10,
                level: 500,
            }
            .extract_audio(source, dest)
            .await
        }

        async fn remux(&self, _source: &SourceMedia, _dubbed: &Path, dest: &Path) -> Result<()> {
            std::fs::write(dest, b"partial")?;
            Err(RedubError::MuxingFailed {
                message: "ffmpeg exited with code 1: boom".to_string(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn failed_mux_leaves_no_artifact_and_keeps_previous_one() {
        let f = fixture("mp4");
        let artifact = f.request.output_dir.join("dubbed.mp4");
        let broken = || {
            let stage = DubbingStage::new(
                Arc::new(MockSpeechToText::new()),
                Arc::new(MockTranslator::new()),
                Arc::new(MockSynthesizer::new(1000, Duration::from_secs(1))),
                "es",
                "alloy",
            );
            Dubber::new(Arc::new(BrokenMuxTranscoder), stage, Workspace::new(&f.work))
        };

        let dubber = broken();
        let result = dubber.run(&f.request).await;
        assert!(matches!(result, Err(RedubError::MuxingFailed { .. })));
        assert_eq!(dubber.snapshot().failed_stage, Some(RunStatus::Muxing));
        assert!(!artifact.exists());

        std::fs::write(&artifact, b"previous good artifact").unwrap();
        assert!(broken().run(&f.request).await.is_err());
        assert_eq!(std::fs::read(&artifact).unwrap(), b"previous good artifact");
        assert!(!artifact.with_extension("mp4.part").exists());
    }

    #[test]
    fn promote_moves_staged_file_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.mp4");
        let dest = dir.path().join("out").join("dubbed.mp4");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&staged, b"new").unwrap();
        std::fs::write(&dest, b"old").unwrap();

        promote(&staged, &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
        assert!(!staged.exists());
    }

    #[test]
    fn promote_of_missing_file_leaves_destination_alone() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dubbed.webm");
        std::fs::write(&dest, b"old").unwrap();

        assert!(promote(&dir.path().join("missing.webm"), &dest).is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");
        assert!(!dir.path().join("dubbed.webm.part").exists());
    }

    #[tokio::test]
    async fn failed_run_can_be_followed_by_new_run() {
        let f = fixture("mp4");
        let silent = dubber(&f.work, 30, 0);
        assert!(silent.run(&f.request).await.is_err());

        let dubber = self::dubber(&f.work, 30, 500);
        assert!(dubber.run(&f.request).await.is_ok());
    }
}
