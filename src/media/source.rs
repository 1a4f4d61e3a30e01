//! Source media and final artifact descriptors.

use crate::defaults;
use crate::error::{RedubError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Output container, inferred from the input's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Webm,
    Mp4,
}

impl Container {
    /// Infer from a file name: `.webm` (any case) is WebM, anything else MP4.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("webm") => Container::Webm,
            _ => Container::Mp4,
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Mp4 => "mp4",
        }
    }

    /// Audio codec ffmpeg should encode the dubbed track with.
    pub fn audio_codec(self) -> &'static str {
        match self {
            Container::Webm => "libopus",
            Container::Mp4 => "aac",
        }
    }

    /// Name of the final artifact, e.g. `dubbed.mp4`.
    pub fn artifact_name(self) -> String {
        format!("{}.{}", defaults::ARTIFACT_STEM, self.extension())
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The uploaded video, accepted for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMedia {
    path: PathBuf,
    container: Container,
}

impl SourceMedia {
    /// Accept an input file. It must exist and be a regular file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(RedubError::NoInputMedia {
                path: path.display().to_string(),
            });
        }
        let container = Container::from_path(&path);
        Ok(Self { path, container })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn container(&self) -> Container {
        self.container
    }
}

/// The dubbed video produced by a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalArtifact {
    pub path: PathBuf,
    pub container: Container,
}
