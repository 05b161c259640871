//! Gzip body codec.
//!
//! Inflation is bounded: a body that expands past `limit` bytes is rejected
//! instead of being buffered without end.

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{MetrixError, Result};

/// Compress `data` into a single gzip member.
pub fn compress(data: &[u8]) -> Result<Bytes> {
    let mut enc = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    enc.write_all(data)
        .map_err(|e| MetrixError::Internal(format!("gzip write failed: {e}")))?;
    let out = enc
        .finish()
        .map_err(|e| MetrixError::Internal(format!("gzip finish failed: {e}")))?;
    Ok(Bytes::from(out))
}

/// Inflate a gzip body, refusing output larger than `limit` bytes.
///
/// Concatenated members are inflated in order; anything after the last
/// member that is not another gzip member is an error.
pub fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| MetrixError::BadInput(format!("invalid gzip body: {e}")))?;
    if out.len() > limit {
        return Err(MetrixError::BadInput(format!(
            "gzip body inflates past {limit} bytes"
        )));
    }
    Ok(out)
}
