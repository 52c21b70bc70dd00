mod query;
mod window;

#[cfg(test)]
pub mod testing;

use std::fmt::Display;

use crate::core::time::{DateTime, DateTimeRange};

pub use query::ReadingsQuery;
pub use window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    Weather,
    WaterTemp,
}

impl ReadingKind {
    /// Path segment the kind is served under.
    pub fn path(&self) -> &'static str {
        match self {
            ReadingKind::Weather => "weather",
            ReadingKind::WaterTemp => "water-temp",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            ReadingKind::Weather => "weather",
            ReadingKind::WaterTemp => "water_temps",
        }
    }

    /// Name of the metric carried in `Reading::value`.
    pub fn metric(&self) -> &'static str {
        "temperature"
    }
}

impl Display for ReadingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// One stored sensor observation. Readings are written by the collector and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub kind: ReadingKind,
    pub recorded_at: DateTime,
    pub value: f64,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingsResult {
    Latest(Option<Reading>),
    Series {
        range: DateTimeRange,
        readings: Vec<Reading>,
    },
}
