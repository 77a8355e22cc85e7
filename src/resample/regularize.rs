use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::progress::{Progress, Stage};
use crate::resample::calendar::{days_spanned, hours_of, truncate_to_hour};
use crate::resample::types::{Dataset, HourlySlot, Reading};
use crate::resample::utility::{Combine, FieldAccumulator, interpolate_linear};

/// Sampling interval of the reference exports, in minutes.
pub const DEFAULT_SAMPLING_MINUTES: u32 = 5;

/// Treatment of missing values at the very start or end of the series, where
/// interpolation has no known neighbour on one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Leave them missing.
    #[default]
    Propagate,
    /// Copy the nearest known value of the same field.
    Clamp,
    /// Remove leading and trailing slots that still have a missing field.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularizeOptions {
    pub sampling_interval_minutes: u32,
    pub edge_policy: EdgePolicy,
    /// Also synthesize days inside the covered range that have no reading at all.
    pub fill_absent_days: bool,
}

impl Default for RegularizeOptions {
    fn default() -> Self {
        Self {
            sampling_interval_minutes: DEFAULT_SAMPLING_MINUTES,
            edge_policy: EdgePolicy::default(),
            fill_absent_days: true,
        }
    }
}

impl RegularizeOptions {
    /// Multiplier turning a mean per-sample value into a per-hour total.
    pub fn rescale_factor(&self) -> EngineResult<f64> {
        match self.sampling_interval_minutes {
            m @ 1..=60 => Ok(60.0 / f64::from(m)),
            m => Err(EngineError::InvalidSamplingInterval(m)),
        }
    }
}

/// Drops exact repeats of earlier rows, keeping first occurrences in order.
pub fn dedup_readings(readings: &[Reading]) -> Vec<Reading> {
    let mut seen = HashSet::with_capacity(readings.len());
    readings
        .iter()
        .filter(|r| seen.insert(row_key(r)))
        .cloned()
        .collect()
}

fn row_key(reading: &Reading) -> (NaiveDateTime, Vec<u64>) {
    (
        reading.timestamp,
        reading.values.iter().map(|v| v.to_bits()).collect(),
    )
}

/// Builds the gap-free hourly series for `dataset`.
///
/// Output is sorted by timestamp with 24 slots per covered day. Only slots at
/// the head or tail of the series can still hold missing values, depending on
/// `options.edge_policy`.
#[tracing::instrument(skip_all, fields(readings = dataset.readings.len()))]
pub fn regularize(
    dataset: &Dataset,
    options: &RegularizeOptions,
    progress: &dyn Progress,
) -> EngineResult<Vec<HourlySlot>> {
    let factor = options.rescale_factor()?;
    let width = dataset.fields.len();
    check_widths(&dataset.readings, width)?;

    let unique = dedup_readings(&dataset.readings);
    progress.stage(Stage::Deduplicated, unique.len());

    let mut hourly = hourly_means(&unique, width);
    progress.stage(Stage::HourlyMeans, hourly.len());

    let synthesized = synthesize_missing_hours(&mut hourly, width, options.fill_absent_days);
    debug!(synthesized, "Missing hours synthesized");
    let mut slots: Vec<HourlySlot> = hourly.into_values().collect();
    progress.stage(Stage::GapsSynthesized, slots.len());

    fill_by_interpolation(&mut slots, width, options.edge_policy);
    progress.stage(Stage::Interpolated, slots.len());

    for value in slots.iter_mut().flat_map(|s| s.values.iter_mut()).flatten() {
        *value *= factor;
    }
    progress.stage(Stage::Rescaled, slots.len());

    Ok(slots)
}

fn check_widths(readings: &[Reading], width: usize) -> EngineResult<()> {
    match readings.iter().find(|r| r.values.len() != width) {
        Some(r) => Err(EngineError::FieldCountMismatch {
            timestamp: r.timestamp.to_string(),
            expected: width,
            found: r.values.len(),
        }),
        None => Ok(()),
    }
}

fn hourly_means(readings: &[Reading], width: usize) -> BTreeMap<NaiveDateTime, HourlySlot> {
    let mut groups: BTreeMap<NaiveDateTime, FieldAccumulator> = BTreeMap::new();
    for reading in readings {
        groups
            .entry(truncate_to_hour(reading.timestamp))
            .or_insert_with(|| FieldAccumulator::new(width))
            .push(reading.values.iter().copied().map(Some));
    }
    groups
        .into_iter()
        .map(|(timestamp, acc)| {
            let values = acc.finish(Combine::Mean);
            (timestamp, HourlySlot { timestamp, values })
        })
        .collect()
}

/// Inserts an all-missing row for every absent hour of each covered day and
/// returns how many were added.
fn synthesize_missing_hours(
    hourly: &mut BTreeMap<NaiveDateTime, HourlySlot>,
    width: usize,
    fill_absent_days: bool,
) -> usize {
    let present: BTreeSet<_> = hourly.keys().map(|ts| ts.date()).collect();
    let bounds = present.first().copied().zip(present.last().copied());
    let days: Vec<_> = match bounds {
        Some((first, last)) if fill_absent_days => days_spanned(first, last).collect(),
        _ => present.into_iter().collect(),
    };

    let mut added = 0;
    for hour in days.into_iter().flat_map(hours_of) {
        hourly.entry(hour).or_insert_with(|| {
            added += 1;
            HourlySlot::missing(hour, width)
        });
    }
    added
}

fn fill_by_interpolation(slots: &mut Vec<HourlySlot>, width: usize, policy: EdgePolicy) {
    for field in 0..width {
        let mut column: Vec<Option<f64>> = slots.iter().map(|s| s.values[field]).collect();
        interpolate_linear(&mut column, policy == EdgePolicy::Clamp);
        for (slot, value) in slots.iter_mut().zip(column) {
            slot.values[field] = value;
        }
    }

    if policy == EdgePolicy::Drop {
        let head = slots.iter().take_while(|s| !s.is_complete()).count();
        slots.drain(..head);
        let tail = slots.iter().rev().take_while(|s| !s.is_complete()).count();
        slots.truncate(slots.len() - tail);
    }
}
