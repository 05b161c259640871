//! Shared error type across metrix crates.

use thiserror::Error;

/// Stable error codes, used in logs and client-facing bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric (kind, name) is absent.
    NotFound,
    /// Malformed value, unknown type, wrong content type.
    BadInput,
    /// Agent-side push failure.
    Transport,
    /// Snapshot read/write failure.
    Persistence,
    /// Startup configuration is unusable.
    Config,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// String representation used in responses and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BadInput => "BAD_INPUT",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Persistence => "PERSISTENCE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetrixError>;

/// Unified error type used by core, collector and agent.
#[derive(Debug, Error)]
pub enum MetrixError {
    #[error("metric not found: {0}")]
    NotFound(String),
    #[error("bad input: {0}")]
    BadInput(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("persistence: {0}")]
    Persistence(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetrixError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetrixError::NotFound(_) => ErrorCode::NotFound,
            MetrixError::BadInput(_) => ErrorCode::BadInput,
            MetrixError::Transport(_) => ErrorCode::Transport,
            MetrixError::Persistence(_) => ErrorCode::Persistence,
            MetrixError::Config(_) => ErrorCode::Config,
            MetrixError::Internal(_) => ErrorCode::Internal,
        }
    }
}
