//! Shared error type across claimset crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed document.
    BadRequest,
    /// Resource not available (e.g. auditor disabled).
    NotFound,
    /// Unsupported config or registry version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ClaimsError>;

/// Unified error type used by core and server.
///
/// Lookups never produce these; only loading, config and request-boundary
/// paths do.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),
    #[error("internal: {0}")]
    Internal(String),
}

impl ClaimsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ClaimsError::BadRequest(_) | ClaimsError::DuplicateId { .. } => ClientCode::BadRequest,
            ClaimsError::NotFound(_) => ClientCode::NotFound,
            ClaimsError::UnsupportedVersion(_) => ClientCode::UnsupportedVersion,
            ClaimsError::Internal(_) => ClientCode::Internal,
        }
    }
}
