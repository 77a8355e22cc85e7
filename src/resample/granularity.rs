use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Calendar resolution of the aggregated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(EngineError::InvalidGranularity(s.to_string())),
        }
    }
}

/// What the caller asked for: the untouched source rows, or a resampled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSection {
    Original,
    Resampled(Granularity),
}

impl TimeSection {
    /// Every accepted name, in the order they are documented.
    pub fn names() -> Vec<&'static str> {
        std::iter::once("original")
            .chain(Granularity::ALL.iter().map(Granularity::as_str))
            .collect()
    }
}

impl fmt::Display for TimeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSection::Original => f.write_str("original"),
            TimeSection::Resampled(g) => g.fmt(f),
        }
    }
}

impl FromStr for TimeSection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("original") {
            return Ok(TimeSection::Original);
        }
        s.parse().map(TimeSection::Resampled)
    }
}

impl Serialize for TimeSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
