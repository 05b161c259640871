use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::{Metric, MetricKind};
use metrix_core::store::Repository;

use crate::app_state::AppState;
use crate::error::ApiError;

use super::{require_json, TEXT_PLAIN};

/// `POST /update/{type}/{name}/{value}`
pub async fn update_path(
    State(app): State<AppState>,
    Path((kind, name, raw)): Path<(String, String, String)>,
) -> std::result::Result<Response, ApiError> {
    let kind: MetricKind = kind.parse()?;
    match kind {
        MetricKind::Counter => {
            let delta: i64 = raw
                .parse()
                .map_err(|e| MetrixError::BadInput(format!("invalid counter value {raw:?}: {e}")))?;
            app.store().set_counter(&name, delta)?;
        }
        MetricKind::Gauge => {
            let value: f64 = raw
                .parse()
                .map_err(|e| MetrixError::BadInput(format!("invalid gauge value {raw:?}: {e}")))?;
            app.store().set_gauge(&name, value)?;
        }
    }
    app.after_write().await;

    Ok((StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)], "").into_response())
}

/// `POST /update/` with a JSON record; answers with the stored state of that metric.
pub async fn update_json(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<Metric>, ApiError> {
    require_json(&headers)?;
    let metric = Metric::from_json(&body)?;
    let stored = apply(app.store(), &metric)?;
    app.after_write().await;
    Ok(Json(stored))
}

fn apply(store: &dyn Repository, m: &Metric) -> Result<Metric> {
    match m.kind {
        MetricKind::Counter => {
            store.set_counter(&m.id, m.require_delta()?)?;
            Ok(Metric::counter(&m.id, store.get_counter(&m.id)?))
        }
        MetricKind::Gauge => {
            store.set_gauge(&m.id, m.require_value()?)?;
            Ok(Metric::gauge(&m.id, store.get_gauge(&m.id)?))
        }
    }
}
