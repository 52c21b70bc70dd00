mod chart;
mod readings;

use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, web};
use derive_more::derive::{Display, Error};

use crate::port::{ChartRenderer, ReadingsRepository};
use crate::reading::{ReadingKind, ReadingsQuery};

pub fn new_routes<R>(query: ReadingsQuery<R>, renderer: Arc<dyn ChartRenderer>) -> Vec<actix_web::Scope>
where
    R: ReadingsRepository + 'static,
{
    let query = web::Data::new(query);

    vec![
        readings::routes(ReadingKind::Weather, query.clone()),
        readings::routes(ReadingKind::WaterTemp, query.clone()).service(chart::routes(query, renderer)),
    ]
}

type ApiResponse = Result<HttpResponse, ApiError>;

#[derive(Debug, Error, Display)]
enum ApiError {
    #[display("Error accessing readings")]
    StoreUnavailable(#[error(not(source))] anyhow::Error),

    #[display("Error rendering chart")]
    ChartRendering(#[error(not(source))] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        tracing::warn!("ApiError: {:?}", self);

        match self {
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ChartRendering(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
