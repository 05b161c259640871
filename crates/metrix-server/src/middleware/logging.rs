//! One structured `info` event per request.

use std::time::Instant;

use axum::{body::HttpBody, extract::Request, middleware::Next, response::Response};

pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let res = next.run(req).await;

    tracing::info!(
        %method,
        %uri,
        status = res.status().as_u16(),
        elapsed_us = started.elapsed().as_micros() as u64,
        size = res.body().size_hint().exact().unwrap_or_default(),
        "request"
    );
    res
}
