//! Request pipeline layers.
//!
//! Order on the wire: `gzip` (outermost) → `logging` → handlers, so logged
//! sizes are those of the uncompressed response.

pub mod gzip;
pub mod logging;

pub use gzip::gzip;
pub use logging::log_requests;

/// Media type without parameters: `"text/html; charset=utf-8"` → `"text/html"`.
pub fn media_type(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(base, _)| base)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_parameters() {
        assert_eq!(media_type("text/html; charset=utf-8"), "text/html");
        assert_eq!(media_type(" application/json "), "application/json");
        assert_eq!(media_type(""), "");
    }
}
