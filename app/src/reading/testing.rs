use std::sync::Arc;

use chrono::TimeZone;

use super::{Reading, ReadingKind};
use crate::core::time::{DateTime, DateTimeRange};
use crate::port::ReadingsRepository;

/// Repository backed by a plain vector, applying the same filtering and ordering as the database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    readings: Arc<Vec<Reading>>,
}

impl InMemoryRepository {
    pub fn with(readings: Vec<Reading>) -> Self {
        Self {
            readings: Arc::new(readings),
        }
    }

    fn of_kind(&self, kind: ReadingKind) -> Vec<Reading> {
        let mut readings: Vec<Reading> = self
            .readings
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        readings
    }
}

impl ReadingsRepository for InMemoryRepository {
    async fn latest(&self, kind: ReadingKind) -> anyhow::Result<Option<Reading>> {
        Ok(self.of_kind(kind).into_iter().next())
    }

    async fn between(&self, kind: ReadingKind, range: &DateTimeRange) -> anyhow::Result<Vec<Reading>> {
        Ok(self
            .of_kind(kind)
            .into_iter()
            .filter(|r| range.contains(r.recorded_at))
            .collect())
    }
}

pub fn fixed_now() -> DateTime {
    chrono::Local
        .with_ymd_and_hms(2026, 10, 18, 15, 0, 0)
        .single()
        .unwrap()
        .into()
}

pub fn reading(kind: ReadingKind, recorded_at: DateTime, value: f64) -> Reading {
    Reading {
        kind,
        recorded_at,
        value,
        humidity: match kind {
            ReadingKind::Weather => Some(55.0),
            ReadingKind::WaterTemp => None,
        },
    }
}
