use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::resample::regularize::{DEFAULT_SAMPLING_MINUTES, EdgePolicy, RegularizeOptions};

/// Engine settings, optionally loaded from a JSON file.
///
/// Every key may be omitted:
/// ```json
/// {
///   "sampling_interval_minutes": 5,
///   "edge_policy": "propagate",
///   "fill_absent_days": true,
///   "dedup_original": false,
///   "delimiter": ","
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Native spacing of the source readings.
    pub sampling_interval_minutes: u32,
    pub edge_policy: EdgePolicy,
    pub fill_absent_days: bool,
    /// Whether `original` output drops repeated rows.
    pub dedup_original: bool,
    /// Field separator of the source CSV.
    pub delimiter: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling_interval_minutes: DEFAULT_SAMPLING_MINUTES,
            edge_policy: EdgePolicy::default(),
            fill_absent_days: true,
            dedup_original: false,
            delimiter: ',',
        }
    }
}

impl EngineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn regularize_options(&self) -> RegularizeOptions {
        RegularizeOptions {
            sampling_interval_minutes: self.sampling_interval_minutes,
            edge_policy: self.edge_policy,
            fill_absent_days: self.fill_absent_days,
        }
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter {:?} is not a single ASCII character", self.delimiter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.regularize_options(), RegularizeOptions::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json(r#"{"edge_policy": "clamp", "delimiter": ";"}"#).unwrap();
        assert_eq!(config.edge_policy, EdgePolicy::Clamp);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.sampling_interval_minutes, 5);
    }

    #[test]
    fn test_rejects_unknown_keys_and_wide_delimiters() {
        assert!(EngineConfig::from_json(r#"{"granularity": "day"}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"delimiter": "é"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("energy_resampler_test_config.json");
        fs::write(&path, r#"{"sampling_interval_minutes": 15, "dedup_original": true}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.sampling_interval_minutes, 15);
        assert!(config.dedup_original);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(EngineConfig::load("/nonexistent/energy_resampler.json").is_err());
    }
}
