//! Temporal regularization and multi-granularity aggregation.
//!
//! Raw readings are deduplicated, averaged onto an hourly grid, gap-filled by
//! linear interpolation and rescaled (`regularize`), then summed into
//! calendar-aligned buckets (`aggregate`).

pub mod aggregate;
pub mod calendar;
pub mod granularity;
pub mod regularize;
pub mod types;
pub mod utility;
