use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use metrix_core::protocol::{Metric, MetricKind};

use crate::app_state::AppState;
use crate::error::ApiError;

use super::{require_json, TEXT_PLAIN};

/// `GET /value/{type}/{name}` as plain text.
pub async fn value_path(
    State(app): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind: MetricKind = kind.parse()?;
    let body = match kind {
        MetricKind::Counter => app.store().get_counter(&name)?.to_string(),
        // Display for f64 is the shortest string that round-trips.
        MetricKind::Gauge => app.store().get_gauge(&name)?.to_string(),
    };
    Ok(([(CONTENT_TYPE, TEXT_PLAIN)], body).into_response())
}

/// `POST /value/` with `{id, type}`; answers with the full record.
pub async fn value_json(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Metric>, ApiError> {
    require_json(&headers)?;
    let query = Metric::from_json(&body)?;
    let found = match query.kind {
        MetricKind::Counter => Metric::counter(&query.id, app.store().get_counter(&query.id)?),
        MetricKind::Gauge => Metric::gauge(&query.id, app.store().get_gauge(&query.id)?),
    };
    Ok(Json(found))
}
