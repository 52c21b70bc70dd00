use anyhow::Context as _;
use sqlx::PgPool;

use crate::core::time::DateTimeRange;
use crate::port::ReadingsRepository;
use crate::reading::{Reading, ReadingKind};

#[derive(Debug, Clone)]
pub struct PgReadingsRepository {
    pool: PgPool,
}

impl PgReadingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    recorded_at: chrono::DateTime<chrono::Utc>,
    temperature: f64,
    humidity: Option<f64>,
}

impl ReadingRow {
    fn into_reading(self, kind: ReadingKind) -> Reading {
        Reading {
            kind,
            recorded_at: self.recorded_at.into(),
            value: self.temperature,
            humidity: self.humidity,
        }
    }
}

//water_temps has no humidity column, it is selected as typed NULL to share the row mapping
fn latest_query(kind: ReadingKind) -> &'static str {
    match kind {
        ReadingKind::Weather => {
            r#"SELECT recorded_at, temperature, humidity
            FROM weather
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1"#
        }
        ReadingKind::WaterTemp => {
            r#"SELECT recorded_at, temperature, NULL::double precision AS humidity
            FROM water_temps
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1"#
        }
    }
}

fn between_query(kind: ReadingKind) -> &'static str {
    match kind {
        ReadingKind::Weather => {
            r#"SELECT recorded_at, temperature, humidity
            FROM weather
            WHERE recorded_at >= $1
            AND recorded_at <= $2
            ORDER BY recorded_at DESC, id DESC"#
        }
        ReadingKind::WaterTemp => {
            r#"SELECT recorded_at, temperature, NULL::double precision AS humidity
            FROM water_temps
            WHERE recorded_at >= $1
            AND recorded_at <= $2
            ORDER BY recorded_at DESC, id DESC"#
        }
    }
}

impl ReadingsRepository for PgReadingsRepository {
    #[tracing::instrument(skip(self), fields(table = kind.table()))]
    async fn latest(&self, kind: ReadingKind) -> anyhow::Result<Option<Reading>> {
        let row: Option<ReadingRow> = sqlx::query_as(latest_query(kind))
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Error fetching latest {kind} reading"))?;

        Ok(row.map(|row| row.into_reading(kind)))
    }

    #[tracing::instrument(skip(self), fields(table = kind.table()))]
    async fn between(&self, kind: ReadingKind, range: &DateTimeRange) -> anyhow::Result<Vec<Reading>> {
        let rows: Vec<ReadingRow> = sqlx::query_as(between_query(kind))
            .bind(range.start().into_db())
            .bind(range.end().into_db())
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Error fetching {kind} readings in {range}"))?;

        Ok(rows.into_iter().map(|row| row.into_reading(kind)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::TimeWindow;
    use crate::settings::test::TestSettings;
    use crate::t;

    #[test]
    fn test_queries_target_table_of_kind() {
        for kind in [ReadingKind::Weather, ReadingKind::WaterTemp] {
            let from = format!("FROM {}\n", kind.table());

            assert!(latest_query(kind).contains(&from));
            assert!(between_query(kind).contains(&from));
        }
    }

    #[test]
    fn test_queries_order_newest_first() {
        for kind in [ReadingKind::Weather, ReadingKind::WaterTemp] {
            assert!(latest_query(kind).contains("ORDER BY recorded_at DESC"));
            assert!(latest_query(kind).ends_with("LIMIT 1"));
            assert!(between_query(kind).contains("ORDER BY recorded_at DESC"));
        }
    }

    async fn live_repository() -> PgReadingsRepository {
        let settings = TestSettings::load().expect("test.toml with live_database section");
        let pool = settings.live_database.new_pool().await.unwrap();
        PgReadingsRepository::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires a live database configured in test.toml"]
    async fn test_live_latest_water_temp() {
        let repo = live_repository().await;

        let latest = repo.latest(ReadingKind::WaterTemp).await.unwrap();

        if let Some(reading) = latest {
            assert_eq!(reading.kind, ReadingKind::WaterTemp);
            assert!(reading.humidity.is_none());
        }
    }

    #[tokio::test]
    #[ignore = "requires a live database configured in test.toml"]
    async fn test_live_monthly_weather_is_sorted_and_bounded() {
        let repo = live_repository().await;
        let range = TimeWindow::Monthly.range_at(t!(now)).unwrap();

        let readings = repo.between(ReadingKind::Weather, &range).await.unwrap();

        assert!(readings.iter().all(|r| range.contains(r.recorded_at)));
        assert!(readings.windows(2).all(|w| w[0].recorded_at >= w[1].recorded_at));
    }
}
