//! HTTP mapping for `MetrixError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrix_core::error::{ErrorCode, MetrixError};

/// Handler error: `NotFound` → 404, `BadInput` → 400, anything else → 500.
#[derive(Debug)]
pub struct ApiError(pub MetrixError);

impl From<MetrixError> for ApiError {
    fn from(e: MetrixError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::BadInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code().as_str(), error = %self.0, "request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (MetrixError::NotFound("gauge x".into()), StatusCode::NOT_FOUND),
            (MetrixError::BadInput("bad".into()), StatusCode::BAD_REQUEST),
            (MetrixError::Persistence("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, want) in cases {
            assert_eq!(ApiError::from(err).status(), want);
        }
    }
}
