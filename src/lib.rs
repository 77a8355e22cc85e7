pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod progress;
pub mod resample;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use resample::granularity::{Granularity, TimeSection};
pub use resample::types::{AggregateBucket, Dataset, HourlySlot, Reading, Table, WeekKey};
