use actix_web::{HttpResponse, web};
use serde::Serialize;

use super::{ApiError, ApiResponse};
use crate::port::ReadingsRepository;
use crate::reading::{Reading, ReadingKind, ReadingsQuery, ReadingsResult, TimeWindow};

pub fn routes<R>(kind: ReadingKind, query: web::Data<ReadingsQuery<R>>) -> actix_web::Scope
where
    R: ReadingsRepository + 'static,
{
    web::scope(&format!("/{}", kind.path()))
        .app_data(web::Data::new(kind))
        .app_data(query)
        .route("/{window}", web::get().to(get_readings::<R>))
}

async fn get_readings<R: ReadingsRepository + 'static>(
    kind: web::Data<ReadingKind>,
    query: web::Data<ReadingsQuery<R>>,
    window: web::Path<TimeWindow>,
) -> ApiResponse {
    let result = query
        .query(**kind, window.into_inner())
        .await
        .map_err(ApiError::StoreUnavailable)?;

    Ok(json_response(&result))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadingDTO {
    recorded_at: String,
    value: f64,
    metric: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<f64>,
}

impl From<&Reading> for ReadingDTO {
    fn from(reading: &Reading) -> Self {
        Self {
            recorded_at: reading.recorded_at.to_iso_string(),
            value: reading.value,
            metric: reading.kind.metric(),
            humidity: reading.humidity,
        }
    }
}

//empty results are still 200: `null` for the latest reading, `[]` for a series
fn json_response(result: &ReadingsResult) -> HttpResponse {
    match result {
        ReadingsResult::Latest(reading) => HttpResponse::Ok().json(reading.as_ref().map(ReadingDTO::from)),
        ReadingsResult::Series { readings, .. } => {
            HttpResponse::Ok().json(readings.iter().map(ReadingDTO::from).collect::<Vec<_>>())
        }
    }
}
