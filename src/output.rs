//! Output formatting and persistence for result tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV files (optionally
//! gzip-compressed).

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::resample::types::{AggregateBucket, Table};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logs the table using Rust's debug pretty-print format.
pub fn print_pretty(table: &Table) {
    debug!("{:#?}", table);
}

/// Writes the table to stdout as pretty-printed JSON.
pub fn print_json(table: &Table) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, table)?;
    writeln!(handle)?;
    Ok(())
}

/// Writes `table` as CSV to `path`, replacing any existing file.
///
/// Paths ending in `.gz` are gzip-compressed. Missing values become empty
/// cells. Parent directories are created as needed.
#[tracing::instrument(skip(path, table), fields(path = %path.display(), rows = table.len()))]
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(&mut encoder, table)?;
        encoder.finish()?;
    } else {
        write_csv(file, table)?;
    }

    info!("Table written");
    Ok(())
}

/// Writes `table` as CSV to any writer.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(table.headers())?;
    for row in &table.rows {
        writer.write_record(render_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn render_row(row: &AggregateBucket) -> Vec<String> {
    let mut cells = vec![format_timestamp(row.timestamp)];
    if let Some(key) = row.week {
        cells.push(key.year.to_string());
        cells.push(key.week.to_string());
    }
    cells.extend(
        row.values
            .iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
    );
    cells
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
