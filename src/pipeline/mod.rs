//! Segmented dubbing pipeline.
//!
//! A run extracts the source's audio, cuts it into fixed-length chunks, dubs
//! each chunk (transcribe → translate → synthesize), concatenates the results
//! in chunk order and remuxes them onto the original video.

pub mod assembler;
pub mod budget;
pub mod dubbing;
pub mod orchestrator;
pub mod progress;
pub mod segmenter;
pub mod status;
pub mod types;
pub mod workspace;

pub use assembler::assemble;
pub use budget::{apply_budget, clamp_minutes, used_count};
pub use dubbing::DubbingStage;
pub use orchestrator::{DubRequest, Dubber};
#[cfg(feature = "cli")]
pub use progress::TerminalProgress;
pub use progress::{NoProgress, ProgressSink, RecordingProgress};
pub use segmenter::Segmenter;
pub use status::{RunSnapshot, RunStatus};
pub use types::{AudioChunk, DubbedTrack, SynthesizedChunk};
pub use workspace::{Workspace, WorkspaceGuard};
