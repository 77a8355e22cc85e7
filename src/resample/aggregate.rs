use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::resample::calendar::{
    truncate_to_day, truncate_to_month, truncate_to_year, week_key,
};
use crate::resample::granularity::Granularity;
use crate::resample::types::{AggregateBucket, HourlySlot, WeekKey};
use crate::resample::utility::{Combine, FieldAccumulator};

/// Collapses the hourly series to `granularity`.
///
/// `Hour` hands the slots back unchanged. Coarser granularities sum every
/// field inside each calendar bucket and are returned in chronological order.
pub fn aggregate(slots: &[HourlySlot], granularity: Granularity) -> Vec<AggregateBucket> {
    match granularity {
        Granularity::Hour => slots.iter().cloned().map(AggregateBucket::from).collect(),
        Granularity::Day => sum_by(slots, truncate_to_day),
        Granularity::Month => sum_by(slots, truncate_to_month),
        Granularity::Year => sum_by(slots, truncate_to_year),
        Granularity::Week => sum_by_week(&sum_by(slots, truncate_to_day)),
    }
}

/// Groups rows on `key(timestamp)` and sums each group, one bucket per key.
fn sum_by<R, F>(rows: &[R], key: F) -> Vec<AggregateBucket>
where
    R: Row,
    F: Fn(NaiveDateTime) -> NaiveDateTime,
{
    let Some(width) = rows.first().map(|r| r.values().len()) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<NaiveDateTime, FieldAccumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry(key(row.timestamp()))
            .or_insert_with(|| FieldAccumulator::new(width))
            .push(row.values().iter().copied());
    }

    groups
        .into_iter()
        .map(|(timestamp, acc)| AggregateBucket {
            timestamp,
            week: None,
            values: acc.finish(Combine::Sum),
        })
        .collect()
}

/// Sums day totals per `(year, week)`; each bucket is stamped with its
/// earliest day.
fn sum_by_week(days: &[AggregateBucket]) -> Vec<AggregateBucket> {
    let Some(width) = days.first().map(|d| d.values.len()) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<WeekKey, (NaiveDateTime, FieldAccumulator)> = BTreeMap::new();
    for day in days {
        let (first_day, acc) = groups
            .entry(week_key(day.timestamp.date()))
            .or_insert_with(|| (day.timestamp, FieldAccumulator::new(width)));
        *first_day = (*first_day).min(day.timestamp);
        acc.push(day.values.iter().copied());
    }

    groups
        .into_iter()
        .map(|(key, (timestamp, acc))| AggregateBucket {
            timestamp,
            week: Some(key),
            values: acc.finish(Combine::Sum),
        })
        .collect()
}

/// A timestamped row of optional values.
trait Row {
    fn timestamp(&self) -> NaiveDateTime;
    fn values(&self) -> &[Option<f64>];
}

impl Row for HourlySlot {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

impl Row for AggregateBucket {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}
