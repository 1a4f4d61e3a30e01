//! Processing budget: caps how much of the source gets dubbed.

use crate::defaults::{MAX_MAX_MINUTES, MIN_MAX_MINUTES};
use crate::pipeline::types::AudioChunk;
use std::time::Duration;
use tracing::info;

/// Clamp a requested maximum to the supported range of minutes.
pub fn clamp_minutes(requested: u32) -> u32 {
    requested.clamp(MIN_MAX_MINUTES, MAX_MAX_MINUTES)
}

/// Number of chunks to process: `min(total, ceil(max_minutes * 60 / chunk_secs))`.
///
/// `max_minutes` is clamped first, so the result is at least one chunk whenever
/// `total > 0`.
pub fn used_count(total: usize, max_minutes: u32, chunk: Duration) -> usize {
    let budget_secs = f64::from(clamp_minutes(max_minutes)) * 60.0;
    let chunk_secs = chunk.as_secs_f64();
    if chunk_secs <= 0.0 {
        return total;
    }
    let allowed = (budget_secs / chunk_secs).ceil() as usize;
    total.min(allowed.max(1))
}

/// Keep the leading chunks that fit the budget and drop the rest.
///
/// Returns the chunks to process in index order and how many were dropped.
pub fn apply_budget(
    mut chunks: Vec<AudioChunk>,
    max_minutes: u32,
    chunk: Duration,
) -> (Vec<AudioChunk>, usize) {
    chunks.sort_by_key(|c| c.index);
    let total = chunks.len();
    let used = used_count(total, max_minutes, chunk);
    if used < total {
        info!(
            used,
            total,
            max_minutes = clamp_minutes(max_minutes),
            "budget limits processing to leading chunks"
        );
    }
    chunks.truncate(used);
    (chunks, total - used)
}
