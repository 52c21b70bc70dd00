#![allow(async_fn_in_trait)]

use std::collections::BTreeMap;

use anyhow::Result;

use crate::core::time::{DateTime, DateTimeRange};
use crate::reading::{Reading, ReadingKind};

pub trait ReadingsRepository {
    async fn latest(&self, kind: ReadingKind) -> Result<Option<Reading>>;

    /// Readings with `recorded_at` inside the range (inclusive), newest first.
    async fn between(&self, kind: ReadingKind, range: &DateTimeRange) -> Result<Vec<Reading>>;
}

pub trait ChartRenderer: Send + Sync {
    fn content_type(&self) -> mime::Mime;

    fn render(&self, title: &str, range: &DateTimeRange, series: &BTreeMap<DateTime, f64>) -> Result<Vec<u8>>;
}
