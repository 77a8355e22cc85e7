//! Entry point tying the regularizer, the aggregator and the output writer together.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::output::write_table;
use crate::progress::{self, Progress, Stage};
use crate::resample::aggregate::aggregate;
use crate::resample::granularity::TimeSection;
use crate::resample::regularize::{dedup_readings, regularize};
use crate::resample::types::{AggregateBucket, Dataset, Table};

/// Stateless pipeline runner; every call starts from the given dataset.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Produces the table for `time_section` and optionally saves it as CSV.
    ///
    /// `time_section` is validated before any data is touched. `verbose` only
    /// selects whether stage progress is logged.
    #[tracing::instrument(skip(self, dataset, save_path), fields(readings = dataset.readings.len()))]
    pub fn generate(
        &self,
        dataset: &Dataset,
        time_section: &str,
        save_path: Option<&Path>,
        verbose: bool,
    ) -> Result<Table> {
        let section: TimeSection = time_section.parse()?;
        let progress = progress::reporter(verbose);

        let table = self.run(dataset, section, progress)?;
        info!(section = %section, rows = table.len(), "Table generated");

        if let Some(path) = save_path {
            write_table(path, &table)?;
            progress.stage(Stage::Saved, table.len());
        }
        Ok(table)
    }

    /// Runs the pure pipeline for an already-validated section.
    pub fn run(
        &self,
        dataset: &Dataset,
        section: TimeSection,
        progress: &dyn Progress,
    ) -> EngineResult<Table> {
        progress.stage(Stage::Loaded, dataset.readings.len());

        let rows = match section {
            TimeSection::Original if self.config.dedup_original => {
                let unique = dedup_readings(&dataset.readings);
                progress.stage(Stage::Deduplicated, unique.len());
                unique.iter().map(AggregateBucket::from).collect()
            }
            TimeSection::Original => dataset.readings.iter().map(AggregateBucket::from).collect(),
            TimeSection::Resampled(granularity) => {
                let slots = regularize(dataset, &self.config.regularize_options(), progress)?;
                let buckets = aggregate(&slots, granularity);
                progress.stage(Stage::Aggregated, buckets.len());
                buckets
            }
        };

        Ok(Table {
            section,
            fields: dataset.fields.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::progress::Silent;
    use crate::progress::testing::Recorder;
    use crate::resample::granularity::Granularity;
    use crate::resample::types::Reading;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::env;
    use std::fs;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn dataset() -> Dataset {
        let mut readings: Vec<Reading> = (0..24 * 12)
            .map(|i| Reading {
                timestamp: at(i / 12, (i % 12) * 5),
                values: vec![1.0, 0.5, 0.0, 2.0, 0.25],
            })
            .collect();
        readings.push(readings[0].clone());
        Dataset::with_default_fields(readings)
    }

    #[test]
    fn test_invalid_section_fails_before_work() {
        let engine = Engine::default();
        let err = engine.generate(&dataset(), "quarter", None, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::InvalidGranularity("quarter".into()))
        );
    }

    #[test]
    fn test_original_keeps_duplicates_by_default() {
        let engine = Engine::default();
        let table = engine.generate(&dataset(), "original", None, false).unwrap();
        assert_eq!(table.len(), 24 * 12 + 1);
        assert_eq!(table.headers()[0], "timestamp");
    }

    #[test]
    fn test_original_dedup_is_configurable() {
        let engine = Engine::new(EngineConfig {
            dedup_original: true,
            ..Default::default()
        });
        let recorder = Recorder::default();
        let table = engine.run(&dataset(), TimeSection::Original, &recorder).unwrap();
        assert_eq!(table.len(), 24 * 12);
        assert_eq!(recorder.rows_at(Stage::Deduplicated), Some(24 * 12));
    }

    #[test]
    fn test_day_totals_after_rescale() {
        let engine = Engine::default();
        let table = engine.generate(&dataset(), "day", None, true).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column("coal"), Some(vec![Some(24.0 * 12.0)]));
        assert_eq!(table.column("solar"), Some(vec![Some(24.0 * 3.0)]));
    }

    #[test]
    fn test_week_section_adds_week_columns() {
        let engine = Engine::default();
        let table = engine
            .run(&dataset(), TimeSection::Resampled(Granularity::Week), &Silent)
            .unwrap();
        assert_eq!(
            table.headers(),
            vec!["timestamp", "year", "week", "coal", "nuclear", "wind", "hydro", "solar"]
        );
        assert_eq!(table.rows[0].timestamp, at(0, 0));
    }

    #[test]
    fn test_empty_dataset_for_every_section() {
        let engine = Engine::default();
        let empty = Dataset::with_default_fields(vec![]);
        for name in TimeSection::names() {
            let table = engine.generate(&empty, name, None, false).unwrap();
            assert!(table.is_empty(), "{name}");
        }
    }

    #[test]
    fn test_saves_when_path_given() {
        let path = env::temp_dir().join("energy_resampler_test_engine_month.csv");
        let _ = fs::remove_file(&path);

        let engine = Engine::default();
        engine
            .generate(&dataset(), "month", Some(&path), false)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,coal,nuclear,wind,hydro,solar");
        assert_eq!(lines[1], "2020-01-01 00:00:00,288,144,0,576,72");

        fs::remove_file(&path).unwrap();
    }
}
