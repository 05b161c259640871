//! Axum router wiring.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, handlers, middleware};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/update", post(handlers::update_json))
        .route("/update/", post(handlers::update_json))
        .route("/update/:kind/:name/:value", post(handlers::update_path))
        .route("/value", post(handlers::value_json))
        .route("/value/", post(handlers::value_json))
        .route("/value/:kind/:name", get(handlers::value_path))
        .layer(DefaultBodyLimit::max(middleware::gzip::MAX_BODY_BYTES))
        .layer(from_fn(middleware::log_requests))
        .layer(from_fn(middleware::gzip))
        .with_state(state)
}
