use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::visits::VisitRecord;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub locations: usize,
}

/// Run the aggregation job and return the stored records, lowest count first.
pub async fn get_visits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<VisitRecord>>, ApiError> {
    tracing::debug!(request_id = %request_id(&headers), "Aggregation triggered over HTTP");

    let records = state.aggregator.run().await?;
    Ok(Json(records))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        locations: state.aggregator.locations().len(),
    })
}
