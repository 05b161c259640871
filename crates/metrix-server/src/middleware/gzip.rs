//! Transparent gzip in both directions.
//!
//! - Requests whose `Content-Encoding` names gzip are inflated before routing;
//!   a body that is not valid gzip is answered with 400.
//! - Responses are compressed only when the client sent `Accept-Encoding: gzip`,
//!   the status is 2xx, and the media type is in `COMPRESSIBLE`. Redirects and
//!   errors always go out as-is.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{
        header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, VARY},
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use metrix_core::error::MetrixError;
use metrix_core::protocol::gzip;

use crate::error::ApiError;

use super::media_type;

/// Cap on request bodies, both as received and after inflation.
pub const MAX_BODY_BYTES: usize = 1 << 20;

pub const COMPRESSIBLE: [&str; 6] = [
    "application/javascript",
    "application/json",
    "text/css",
    "text/html",
    "text/plain",
    "text/xml",
];

pub async fn gzip(req: Request, next: Next) -> Result<Response, ApiError> {
    let wants_gzip = accepts_gzip(req.headers());
    let req = if is_gzip_encoded(req.headers()) {
        inflate_request(req).await?
    } else {
        req
    };

    let res = next.run(req).await;
    if wants_gzip && should_compress(&res) {
        deflate_response(res).await
    } else {
        Ok(res)
    }
}

fn header_tokens<'a>(headers: &'a HeaderMap, name: &HeaderName) -> impl Iterator<Item = &'a str> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
}

fn is_gzip_encoded(headers: &HeaderMap) -> bool {
    header_tokens(headers, &CONTENT_ENCODING).any(|token| media_type(token).eq_ignore_ascii_case("gzip"))
}

/// `Accept-Encoding` lists gzip with a non-zero quality.
fn accepts_gzip(headers: &HeaderMap) -> bool {
    header_tokens(headers, &ACCEPT_ENCODING).any(|token| {
        let mut parts = token.split(';');
        let coding = parts.next().unwrap_or_default().trim();
        if !coding.eq_ignore_ascii_case("gzip") {
            return false;
        }
        let q = parts
            .filter_map(|p| p.split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("q"))
            .map(|(_, v)| v.trim().parse::<f32>().unwrap_or(0.0));
        q.map_or(true, |q| q > 0.0)
    })
}

fn should_compress(res: &Response) -> bool {
    if !res.status().is_success() || res.headers().contains_key(CONTENT_ENCODING) {
        return false;
    }
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(media_type)
        .is_some_and(|mt| COMPRESSIBLE.iter().any(|c| mt.eq_ignore_ascii_case(c)))
}

async fn inflate_request(req: Request) -> Result<Request, ApiError> {
    let (mut parts, body) = req.into_parts();
    let packed = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| MetrixError::BadInput(format!("read request body failed: {e}")))?;
    let plain = gzip::decompress(&packed, MAX_BODY_BYTES)?;

    parts.headers.remove(CONTENT_ENCODING);
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(plain.len()));
    Ok(Request::from_parts(parts, Body::from(plain)))
}

async fn deflate_response(res: Response) -> Result<Response, ApiError> {
    let (mut parts, body) = res.into_parts();
    let plain = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| MetrixError::Internal(format!("read response body failed: {e}")))?;
    let packed = gzip::compress(&plain)?;

    parts.headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    parts.headers.append(VARY, HeaderValue::from_static("accept-encoding"));
    parts.headers.remove(CONTENT_LENGTH);
    Ok(Response::from_parts(parts, Body::from(packed)))
}
