//! Terminal rendering for command results.

use crate::catalog::{LANGUAGES, VOICES};
use crate::error::RedubError;
use crate::media::FinalArtifact;
use crate::pipeline::RunStatus;
use owo_colors::OwoColorize;

/// Listing of supported target languages, marking `current`.
pub fn format_languages(current: &str) -> String {
    let mut out = String::from("Target languages:\n");
    for lang in LANGUAGES {
        let marker = if lang.code.eq_ignore_ascii_case(current) {
            "●"
        } else {
            "○"
        };
        out.push_str(&format!("  {marker} {:<4} {}\n", lang.code, lang.name));
    }
    out
}

/// Listing of voice presets, marking `current`.
pub fn format_voices(current: &str) -> String {
    let mut out = String::from("Voices:\n");
    for voice in VOICES {
        let marker = if voice.name.eq_ignore_ascii_case(current) {
            "●"
        } else {
            "○"
        };
        out.push_str(&format!("  {marker} {:<8} {}\n", voice.name, voice.description));
    }
    out
}

/// One-line failure summary naming the stage and, for service errors, the HTTP status.
pub fn failure_line(stage: Option<RunStatus>, error: &RedubError) -> String {
    let mut line = match stage {
        Some(stage) => format!("Dubbing failed while {stage}: {error}"),
        None => format!("Dubbing failed: {error}"),
    };
    if let Some(hint) = hint(error) {
        line.push_str("\n  ");
        line.push_str(hint);
    }
    line
}

fn hint(error: &RedubError) -> Option<&'static str> {
    match error {
        RedubError::MissingCredential => {
            Some("Set REDUB_API_KEY or run: redub config set api.api_key <KEY>")
        }
        RedubError::UnsupportedLanguage { .. } => Some("Run `redub languages` to see the choices."),
        RedubError::UnknownVoice { .. } => Some("Run `redub voices` to see the choices."),
        RedubError::ExtractionFailed { .. } | RedubError::MuxingFailed { .. } => {
            Some("Run `redub check` to verify ffmpeg is installed.")
        }
        RedubError::NoSegmentsProduced => Some("The source has no audible audio track."),
        _ if error.http_status() == Some(401) => Some("The API key was rejected."),
        _ if error.http_status() == Some(429) => {
            Some("Rate limited by the service; try again later or lower --parallel.")
        }
        _ => None,
    }
}

pub fn print_failure(stage: Option<RunStatus>, error: &RedubError) {
    eprintln!("{} {}", "✗".red(), failure_line(stage, error).red());
}

pub fn print_artifact(artifact: &FinalArtifact) {
    eprintln!(
        "{} Dubbed {} video written to {}",
        "✓".green(),
        artifact.container,
        artifact.path.display().bold()
    );
}
