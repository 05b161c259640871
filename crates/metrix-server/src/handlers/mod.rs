//! HTTP handlers: path-form and JSON-form reads/writes plus the index page.
//!
//! Handlers translate requests into store calls and nothing else; status
//! mapping lives in `ApiError`, compression and logging in `middleware`.

pub mod index;
pub mod update;
pub mod value;

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use metrix_core::error::{MetrixError, Result};

use crate::middleware::media_type;

pub use index::index;
pub use update::{update_json, update_path};
pub use value::{value_json, value_path};

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// JSON endpoints refuse anything not declared as `application/json`.
fn require_json(headers: &HeaderMap) -> Result<()> {
    let ct = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if media_type(ct).eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(MetrixError::BadInput(format!(
            "content type must be application/json, got {ct:?}"
        )))
    }
}
