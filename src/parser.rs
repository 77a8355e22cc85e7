//! CSV parser for raw energy-source exports.
//!
//! The header must contain a `timestamp` column; every other column is a
//! numeric value field, kept in header order.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

use crate::resample::types::{Dataset, Reading};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses readings from CSV bytes, gunzipping them first if needed.
///
/// # Errors
///
/// Fails on a missing `timestamp` header and on the first row with an
/// unparseable timestamp, a non-numeric value or the wrong number of columns.
/// Row errors name the 1-based line number.
pub fn parse_readings(bytes: &[u8], delimiter: u8) -> Result<Dataset> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .context("decompressing gzip input")?;
        debug!(compressed = bytes.len(), decoded = decoded.len(), "Input gunzipped");
        return parse_csv(&decoded, delimiter);
    }
    parse_csv(bytes, delimiter)
}

fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers().context("reading CSV header")?.clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let ts_idx = names
        .iter()
        .position(|n| n == "timestamp")
        .ok_or_else(|| anyhow!("missing `timestamp` column in header {:?}", names))?;

    let field_idx: Vec<usize> = (0..names.len()).filter(|&i| i != ts_idx).collect();
    let fields = field_idx.iter().map(|&i| names[i].clone()).collect();

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records start on line 2, after the header
        let line = idx + 2;
        let record = result.with_context(|| format!("line {line}: malformed CSV row"))?;
        let reading =
            parse_record(&record, ts_idx, &field_idx).with_context(|| format!("line {line}"))?;
        readings.push(reading);
    }

    debug!(rows = readings.len(), "CSV parsed");
    Ok(Dataset::new(fields, readings))
}

fn parse_record(record: &StringRecord, ts_idx: usize, field_idx: &[usize]) -> Result<Reading> {
    let raw_ts = record.get(ts_idx).unwrap_or_default();
    let timestamp = parse_timestamp(raw_ts)?;

    let values = field_idx
        .iter()
        .map(|&i| {
            let raw = record.get(i).unwrap_or_default();
            raw.parse::<f64>()
                .map_err(|_| anyhow!("invalid number {raw:?} in column {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Reading { timestamp, values })
}

/// Parses a naive date-time; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    bail!("invalid timestamp {raw:?}")
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}
