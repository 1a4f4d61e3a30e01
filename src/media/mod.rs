//! Media container handling and the transcoding boundary.

pub mod source;
pub mod transcoder;

pub use source::{Container, FinalArtifact, SourceMedia};
pub use transcoder::{FfmpegTranscoder, Transcoder};
