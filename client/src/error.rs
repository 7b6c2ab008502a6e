//! Error types for the Vindex API client

use thiserror::Error;

/// Result type alias for API client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur when talking to the Vindex backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    // ═══════════════════════════════════════════════════════════
    // Transport Errors
    // ═══════════════════════════════════════════════════════════

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// Request did not complete within its timeout
    #[error("Request timed out")]
    Timeout,

    // ═══════════════════════════════════════════════════════════
    // HTTP Errors
    // ═══════════════════════════════════════════════════════════

    /// Backend answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Token refresh failed; the session has been logged out
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),

    // ═══════════════════════════════════════════════════════════
    // Client-side Errors
    // ═══════════════════════════════════════════════════════════

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, header, body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Input rejected before any request was sent
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ApiError {
    /// HTTP status carried by this error, if it came from a response.
    ///
    /// # Examples
    ///
    /// ```
    /// # use vindex_client::ApiError;
    /// let err = ApiError::Status { status: 404, message: String::new() };
    /// assert_eq!(err.status(), Some(404));
    /// assert_eq!(ApiError::Timeout.status(), None);
    /// ```
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Returns `true` if the error came from the transport layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
