//! Request descriptors and per-call bookkeeping.
//!
//! An [`ApiRequest`] is plain owned data so it can be turned into an HTTP
//! request more than once: the refresh protocol resends it after rotating
//! the token. A [`PendingRequest`] wraps it for the lifetime of one call and
//! records what the interceptor needs to decide about a 401.

use crate::error::{ApiError, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// File sent as a multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type (e.g., "image/png").
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// Multipart form with a single file
    Multipart(FilePart),
}

/// Description of one backend call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path such as `/wines/3`.
    pub path: String,
    /// Query parameters, appended URL-encoded.
    pub query: Vec<(String, String)>,
    /// Body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Request with no query and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart file body.
    #[must_use]
    pub fn multipart(mut self, part: FilePart) -> Self {
        self.body = RequestBody::Multipart(part);
        self
    }
}

/// Successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Raw body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decode a JSON list, treating an empty body or `null` as empty.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not a list of `T`.
    pub fn json_list<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let items: Option<Vec<T>> = self.json()?;
        Ok(items.unwrap_or_default())
    }

    /// Body as UTF-8 text (lossy).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Where a call is in the refresh protocol.
///
/// ```text
/// Sent ──────────────────────────────────────────────► Done
///   │ 401, had auth, not retried
///   ▼
/// Refreshing ──(refresh ok)──► Retried ──────────────► Done
///   │ refresh failed / no refresh token
///   ▼
/// LoggedOut ─────────────────────────────────────────► Done (error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// First attempt is on the wire
    Sent,
    /// Waiting for the refresh endpoint
    Refreshing,
    /// Resent once with a fresh token
    Retried,
    /// Refresh impossible or failed; session cleared
    LoggedOut,
    /// Final outcome delivered to the caller
    Done,
}

impl CallState {
    /// Whether `self → next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Sent, Self::Refreshing | Self::Done)
                | (Self::Refreshing, Self::Retried | Self::LoggedOut)
                | (Self::Retried | Self::LoggedOut, Self::Done)
        )
    }
}

/// Per-call record threaded through the outbound and inbound phases.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    request: ApiRequest,
    had_auth: bool,
    retried: bool,
    sent_token: Option<String>,
    state: CallState,
}

impl PendingRequest {
    /// Start tracking a call.
    #[must_use]
    pub const fn new(request: ApiRequest) -> Self {
        Self {
            request,
            had_auth: false,
            retried: false,
            sent_token: None,
            state: CallState::Sent,
        }
    }

    /// The request being sent.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Whether the latest attempt carried a bearer token.
    #[must_use]
    pub const fn had_auth(&self) -> bool {
        self.had_auth
    }

    /// Whether the refresh protocol already ran for this call.
    #[must_use]
    pub const fn retried(&self) -> bool {
        self.retried
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> CallState {
        self.state
    }

    /// Token attached to the latest attempt.
    #[must_use]
    pub fn sent_token(&self) -> Option<&str> {
        self.sent_token.as_deref()
    }

    /// Outbound phase bookkeeping: remember which token (if any) was attached.
    pub fn record_attempt(&mut self, token: Option<&str>) {
        self.sent_token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self.had_auth = self.sent_token.is_some();
    }

    /// Whether `error` should start the refresh protocol.
    #[must_use]
    pub const fn should_refresh(&self, error: &ApiError) -> bool {
        error.is_unauthorized() && self.had_auth && !self.retried
    }

    /// Enter `Refreshing`; the call can never refresh again.
    pub fn begin_refresh(&mut self) {
        self.retried = true;
        self.advance(CallState::Refreshing);
    }

    /// Move to `next`.
    pub fn advance(&mut self, next: CallState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal call transition {:?} -> {next:?}",
            self.state
        );
        tracing::trace!(from = ?self.state, to = ?next, path = %self.request.path, "Call state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unauthorized() -> ApiError {
        ApiError::Status {
            status: 401,
            message: String::new(),
        }
    }

    #[test]
    fn test_unauthenticated_call_never_refreshes() {
        let mut pending = PendingRequest::new(ApiRequest::get("/wines"));
        pending.record_attempt(None);
        assert!(!pending.had_auth());
        assert!(!pending.should_refresh(&unauthorized()));
    }

    #[test]
    fn test_refresh_allowed_once() {
        let mut pending = PendingRequest::new(ApiRequest::get("/wines"));
        pending.record_attempt(Some("a1"));
        assert!(pending.should_refresh(&unauthorized()));

        pending.begin_refresh();
        pending.advance(CallState::Retried);
        pending.record_attempt(Some("a2"));
        assert_eq!(pending.sent_token(), Some("a2"));
        assert!(!pending.should_refresh(&unauthorized()));
    }

    #[test]
    fn test_other_statuses_do_not_refresh() {
        let mut pending = PendingRequest::new(ApiRequest::get("/wines"));
        pending.record_attempt(Some("a1"));
        let forbidden = ApiError::Status {
            status: 403,
            message: String::new(),
        };
        assert!(!pending.should_refresh(&forbidden));
        assert!(!pending.should_refresh(&ApiError::Timeout));
    }

    #[test]
    fn test_transitions() {
        assert!(CallState::Sent.can_advance_to(CallState::Done));
        assert!(CallState::Refreshing.can_advance_to(CallState::LoggedOut));
        assert!(!CallState::Retried.can_advance_to(CallState::Refreshing));
        assert!(!CallState::Done.can_advance_to(CallState::Sent));
    }

    #[test]
    fn test_empty_list_body() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: b"null".to_vec(),
        };
        assert!(response.json_list::<i32>().unwrap().is_empty());

        let response = ApiResponse {
            status: StatusCode::OK,
            body: Vec::new(),
        };
        assert!(response.json_list::<i32>().unwrap().is_empty());
    }
}
