use std::sync::Arc;

use settings::Settings;

use crate::adapter::db::PgReadingsRepository;
use crate::port::ChartRenderer;
use crate::reading::ReadingsQuery;

mod adapter;
mod core;
mod port;
mod reading;
mod settings;

struct Infrastructure {
    db_pool: sqlx::PgPool,
}

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    let infrastructure = Infrastructure::init(&settings)
        .await
        .expect("Error initializing infrastructure");

    let renderer: Arc<dyn ChartRenderer> = Arc::new(
        settings
            .chart
            .new_renderer()
            .expect("Error initializing chart renderer"),
    );

    let query = ReadingsQuery::new(PgReadingsRepository::new(infrastructure.db_pool.clone()));

    tracing::info!("Starting HTTP server");

    settings
        .http_server
        .run_server(move || adapter::http::new_routes(query.clone(), renderer.clone()))
        .await
        .expect("HTTP server execution failed");
}

impl Infrastructure {
    pub async fn init(settings: &Settings) -> anyhow::Result<Self> {
        settings.monitoring.init()?;

        let db_pool = settings.database.new_pool().await?;

        Ok(Self { db_pool })
    }
}
