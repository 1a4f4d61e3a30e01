//! Dubbing application entry point.
//!
//! Wires configuration, CLI overrides, the service client, ffmpeg and the
//! terminal progress display into a [`Dubber`] and runs it.

use crate::catalog;
use crate::cli::DubArgs;
use crate::config::Config;
use crate::error::{RedubError, Result};
use crate::media::{FfmpegTranscoder, FinalArtifact};
use crate::pipeline::{
    DubRequest, Dubber, DubbingStage, NoProgress, ProgressSink, RunStatus, Segmenter,
    TerminalProgress, Workspace,
};
use crate::services::{Credential, OpenAiClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A failed `dub` command: the error and the stage it happened in, if a run had started.
#[derive(Debug)]
pub struct DubFailure {
    pub stage: Option<RunStatus>,
    pub error: RedubError,
}

impl From<RedubError> for DubFailure {
    fn from(error: RedubError) -> Self {
        Self { stage: None, error }
    }
}

/// Apply `dub` command-line overrides on top of the loaded configuration.
pub fn apply_dub_args(config: &mut Config, args: &DubArgs) {
    if let Some(language) = &args.language {
        config.dub.target_language = language.clone();
    }
    if let Some(voice) = &args.voice {
        config.dub.voice = voice.clone();
    }
    if let Some(minutes) = args.budget_minutes() {
        config.dub.max_minutes = minutes;
    }
    if let Some(dir) = &args.output_dir {
        config.dub.output_dir = Some(dir.clone());
    }
    if let Some(parallel) = args.parallel {
        config.dub.parallel_chunks = parallel;
    }
    if args.keep_work {
        config.dub.keep_work = true;
    }
}

/// Build a dubber from a validated configuration.
///
/// Language and voice are normalized to their catalog spelling.
pub fn build_dubber(config: &Config, progress: Arc<dyn ProgressSink>) -> Result<Dubber> {
    config.validate()?;
    let language = catalog::get_language(&config.dub.target_language).ok_or_else(|| {
        RedubError::UnsupportedLanguage {
            code: config.dub.target_language.clone(),
        }
    })?;
    let voice = catalog::get_voice(&config.dub.voice).ok_or_else(|| RedubError::UnknownVoice {
        name: config.dub.voice.clone(),
    })?;

    let credential = Credential::from_option(config.api.api_key.as_deref())?;
    let client = Arc::new(OpenAiClient::new(&config.api, credential)?);
    let stage = DubbingStage::new(
        client.clone(),
        client.clone(),
        client,
        language.code,
        voice.name,
    );

    let transcoder = Arc::new(FfmpegTranscoder::new(config.media.ffmpeg.clone()));
    let workspace = Workspace::new(config.media.resolved_work_dir());
    let segmenter = Segmenter::new(Duration::from_secs(u64::from(config.dub.chunk_secs)));

    Ok(Dubber::new(transcoder, stage, workspace)
        .with_segmenter(segmenter)
        .with_parallel_chunks(config.dub.parallel_chunks)
        .with_keep_work(config.dub.keep_work)
        .with_progress(progress))
}

/// Run the dub command: extract → segment → dub chunks → assemble → remux.
///
/// # Arguments
/// * `config` - Base configuration (overridden by `args`)
/// * `args` - Command-line options of `redub dub`
/// * `quiet` - Suppress the progress display
pub async fn run_dub_command(
    mut config: Config,
    args: &DubArgs,
    quiet: bool,
) -> std::result::Result<FinalArtifact, DubFailure> {
    apply_dub_args(&mut config, args);

    let progress: Arc<dyn ProgressSink> = if quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(TerminalProgress::new())
    };
    let dubber = build_dubber(&config, progress)?;

    let request = DubRequest {
        input: args.input.clone(),
        output_dir: config
            .dub
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
        max_minutes: config.dub.max_minutes,
    };
    info!(
        input = %request.input.display(),
        language = %config.dub.target_language,
        voice = %config.dub.voice,
        max_minutes = request.max_minutes,
        "starting dub"
    );

    dubber.run(&request).await.map_err(|error| DubFailure {
        stage: dubber.snapshot().failed_stage,
        error,
    })
}
