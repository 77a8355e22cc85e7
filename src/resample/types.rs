//! Data types flowing through the resampling pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::resample::granularity::{Granularity, TimeSection};

/// The energy-source columns of the reference export, in file order.
pub const DEFAULT_FIELDS: &[&str] = &["coal", "nuclear", "wind", "hydro", "solar"];

/// A single raw observation as read from the source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub values: Vec<f64>,
}

/// All readings of one source, together with the names of their value columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub fields: Vec<String>,
    pub readings: Vec<Reading>,
}

impl Dataset {
    pub fn new(fields: Vec<String>, readings: Vec<Reading>) -> Self {
        Self { fields, readings }
    }

    /// Dataset with the default energy-source columns.
    pub fn with_default_fields(readings: Vec<Reading>) -> Self {
        Self::new(
            DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            readings,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// One whole-hour row of the regularized series. `None` marks a value that
/// could not be interpolated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl HourlySlot {
    pub fn missing(timestamp: NaiveDateTime, width: usize) -> Self {
        Self {
            timestamp,
            values: vec![None; width],
        }
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

/// ISO week number paired with the year the week logically belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

/// One output row at the requested granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub timestamp: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<WeekKey>,
    pub values: Vec<Option<f64>>,
}

impl From<HourlySlot> for AggregateBucket {
    fn from(slot: HourlySlot) -> Self {
        Self {
            timestamp: slot.timestamp,
            week: None,
            values: slot.values,
        }
    }
}

impl From<&Reading> for AggregateBucket {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            week: None,
            values: reading.values.iter().copied().map(Some).collect(),
        }
    }
}

/// Final result handed to the caller or the output writer.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub section: TimeSection,
    pub fields: Vec<String>,
    pub rows: Vec<AggregateBucket>,
}

impl Table {
    /// Column names: `timestamp`, then `year` and `week` for weekly output,
    /// then the value fields in source order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["timestamp".to_string()];
        if self.section == TimeSection::Resampled(Granularity::Week) {
            headers.push("year".to_string());
            headers.push("week".to_string());
        }
        headers.extend(self.fields.iter().cloned());
        headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one named field down the table.
    pub fn column(&self, field: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.fields.iter().position(|f| f == field)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_headers_for_week_include_year_and_week() {
        let table = Table {
            section: TimeSection::Resampled(Granularity::Week),
            fields: vec!["coal".into(), "wind".into()],
            rows: vec![],
        };
        assert_eq!(table.headers(), vec!["timestamp", "year", "week", "coal", "wind"]);
    }

    #[test]
    fn test_headers_for_day() {
        let table = Table {
            section: TimeSection::Resampled(Granularity::Day),
            fields: vec!["coal".into()],
            rows: vec![],
        };
        assert_eq!(table.headers(), vec!["timestamp", "coal"]);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table {
            section: TimeSection::Original,
            fields: vec!["coal".into(), "wind".into()],
            rows: vec![AggregateBucket {
                timestamp: ts(0),
                week: None,
                values: vec![Some(1.0), None],
            }],
        };
        assert_eq!(table.column("wind"), Some(vec![None]));
        assert_eq!(table.column("solar"), None);
    }

    #[test]
    fn test_missing_slot_is_incomplete() {
        let slot = HourlySlot::missing(ts(3), 5);
        assert_eq!(slot.values.len(), 5);
        assert!(!slot.is_complete());
    }

    #[test]
    fn test_default_fields() {
        let dataset = Dataset::with_default_fields(vec![]);
        assert_eq!(dataset.fields, vec!["coal", "nuclear", "wind", "hydro", "solar"]);
        assert!(dataset.is_empty());
    }
}
