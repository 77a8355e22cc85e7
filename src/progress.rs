//! Progress reporting for the pipeline.
//!
//! Stages report through an injected [`Progress`] rather than checking a
//! verbosity flag, so the numeric path is identical whether or not anyone is
//! listening.

use std::fmt;
use tracing::info;

/// A completed step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Deduplicated,
    HourlyMeans,
    GapsSynthesized,
    Interpolated,
    Rescaled,
    Aggregated,
    Saved,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Deduplicated => "deduplicated",
            Stage::HourlyMeans => "hourly_means",
            Stage::GapsSynthesized => "gaps_synthesized",
            Stage::Interpolated => "interpolated",
            Stage::Rescaled => "rescaled",
            Stage::Aggregated => "aggregated",
            Stage::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Receives one notification per finished stage with the row count it produced.
pub trait Progress {
    fn stage(&self, stage: Stage, rows: usize);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    fn stage(&self, _stage: Stage, _rows: usize) {}
}

/// Emits each stage as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn stage(&self, stage: Stage, rows: usize) {
        info!(stage = %stage, rows, "Pipeline stage complete");
    }
}

/// Picks the reporter matching a `verbose` flag.
pub fn reporter(verbose: bool) -> &'static dyn Progress {
    if verbose { &TracingProgress } else { &Silent }
}
