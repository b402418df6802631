//! API failure type and its status classification.
//!
//! ERROR HANDLING
//! ==============
//! Only two statuses carry meaning for the session: 401 (the token is no
//! longer valid) and 404 (the record does not exist). Everything else is an
//! opaque failure that the caller decides how to surface.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

const UNAUTHORIZED: u16 = 401;
const NOT_FOUND: u16 = 404;

/// A failed registration API call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("not available on server")]
    Unavailable,
}

/// What a failure means to the session pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 401: the token must be discarded.
    InvalidCredential,
    /// HTTP 404: the requested record does not exist.
    NotFound,
    /// Any other status, network failure, or bad body.
    Other,
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self.status() {
            Some(UNAUTHORIZED) => FailureKind::InvalidCredential,
            Some(NOT_FOUND) => FailureKind::NotFound,
            _ => FailureKind::Other,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == FailureKind::InvalidCredential
    }
}
