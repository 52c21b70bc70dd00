use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{HttpResponse, web};

use super::{ApiError, ApiResponse};
use crate::core::time::DateTime;
use crate::port::{ChartRenderer, ReadingsRepository};
use crate::reading::{Reading, ReadingKind, ReadingsQuery, ReadingsResult, TimeWindow};

const WATER_TEMP_TITLE: &str = "Water Temperature";

struct ChartApiState {
    renderer: Arc<dyn ChartRenderer>,
}

pub fn routes<R>(query: web::Data<ReadingsQuery<R>>, renderer: Arc<dyn ChartRenderer>) -> actix_web::Scope
where
    R: ReadingsRepository + 'static,
{
    web::scope("/graph")
        .app_data(query)
        .app_data(web::Data::new(ChartApiState { renderer }))
        .route("/daily", web::get().to(get_daily_water_temp::<R>))
}

async fn get_daily_water_temp<R: ReadingsRepository + 'static>(
    query: web::Data<ReadingsQuery<R>>,
    state: web::Data<ChartApiState>,
) -> ApiResponse {
    let result = query
        .query(ReadingKind::WaterTemp, TimeWindow::Daily)
        .await
        .map_err(ApiError::StoreUnavailable)?;

    let (range, readings) = match result {
        ReadingsResult::Series { range, readings } => (range, readings),
        ReadingsResult::Latest(_) => {
            return Err(ApiError::ChartRendering(anyhow::anyhow!("Daily window resolved to a single reading")));
        }
    };

    let series = to_series(&readings);
    let renderer = state.renderer.clone();
    let content_type = renderer.content_type();

    let image = web::block(move || renderer.render(WATER_TEMP_TITLE, &range, &series))
        .await
        .map_err(|e| ApiError::ChartRendering(anyhow::anyhow!("Error scheduling chart rendering: {e}")))?
        .map_err(ApiError::ChartRendering)?;

    Ok(HttpResponse::Ok().content_type(content_type).body(image))
}

/// Timestamp to value mapping in ascending time order. Readings sharing a timestamp collapse into one point.
fn to_series(readings: &[Reading]) -> BTreeMap<DateTime, f64> {
    readings.iter().map(|r| (r.recorded_at, r.value)).collect()
}

#[cfg(test)]
mod tests {
    use actix_web::App;
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;

    use super::*;
    use crate::adapter::chart::ChartSettings;
    use crate::core::time::{DateTimeRange, FIXED_NOW};
    use crate::reading::testing::{InMemoryRepository, fixed_now, reading};
    use crate::t;

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn content_type(&self) -> mime::Mime {
            mime::IMAGE_PNG
        }

        fn render(&self, _: &str, _: &DateTimeRange, _: &BTreeMap<DateTime, f64>) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("renderer exploded")
        }
    }

    fn png_renderer() -> Arc<dyn ChartRenderer> {
        Arc::new(ChartSettings::default().new_renderer().unwrap())
    }

    async fn get_chart(repo: InMemoryRepository, renderer: Arc<dyn ChartRenderer>) -> (StatusCode, Option<String>, Vec<u8>) {
        let query = web::Data::new(ReadingsQuery::new(repo));

        FIXED_NOW
            .scope(fixed_now(), async move {
                let app = actix_test::init_service(App::new().service(web::scope("/water-temp").service(routes(query, renderer)))).await;

                let req = actix_test::TestRequest::get().uri("/water-temp/graph/daily").to_request();
                let resp = actix_test::call_service(&app, req).await;
                let status = resp.status();
                let content_type = resp
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let body = actix_test::read_body(resp).await.to_vec();

                (status, content_type, body)
            })
            .await
    }

    #[actix_web::test]
    async fn test_daily_chart_is_png() {
        let repo = InMemoryRepository::with(vec![
            reading(ReadingKind::WaterTemp, fixed_now() - t!(2 hours), 20.1),
            reading(ReadingKind::WaterTemp, fixed_now() - t!(1 hours), 20.3),
        ]);

        let (status, content_type, body) = get_chart(repo, png_renderer()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert!(!body.is_empty());
        assert!(image::load_from_memory_with_format(&body, image::ImageFormat::Png).is_ok());
    }

    #[actix_web::test]
    async fn test_daily_chart_without_readings() {
        let (status, content_type, body) = get_chart(InMemoryRepository::default(), png_renderer()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert!(!body.is_empty());
    }

    #[actix_web::test]
    async fn test_renderer_failure_is_server_error() {
        let (status, _, _) = get_chart(InMemoryRepository::default(), Arc::new(FailingRenderer)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_series_is_ascending_and_deduplicated() {
        let t0 = fixed_now() - t!(2 hours);
        let t1 = fixed_now() - t!(1 hours);
        let readings = vec![
            reading(ReadingKind::WaterTemp, t1, 20.3),
            reading(ReadingKind::WaterTemp, t0, 20.1),
            reading(ReadingKind::WaterTemp, t0, 20.1),
        ];

        let series = to_series(&readings);

        assert_eq!(series.into_iter().collect::<Vec<_>>(), vec![(t0, 20.1), (t1, 20.3)]);
    }
}
