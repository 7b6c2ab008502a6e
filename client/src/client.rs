//! Authenticated API client.
//!
//! Every call goes through [`ApiClient::execute`], which wraps the request in
//! two phases:
//!
//! - **Outbound**: attach `Authorization: Bearer <token>` when the session
//!   has an access token, and record whether it did.
//! - **Inbound**: a 401 on a call that carried a token starts the refresh
//!   protocol: redeem the refresh token once, store the rotated pair, resend
//!   the original request once. If the refresh is impossible or fails, the
//!   session is logged out and the navigator is sent to the login surface.
//!
//! Callers see a single result; the refresh is invisible on success.

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::navigation::{redirect_to_login, Navigator};
use crate::request::{ApiRequest, ApiResponse, CallState, FilePart, PendingRequest, RequestBody};
use crate::session::SessionStore;
use crate::types::{RefreshRequest, RefreshResponse, TokenPair};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Why the refresh protocol ended without new tokens.
enum RefreshError {
    /// Session had no refresh token to redeem
    MissingToken,
    /// Refresh endpoint failed
    Failed(ApiError),
}

/// Last shared refresh that ended the session.
struct FailedRefresh {
    /// Access token the refresh was meant to replace
    token: String,
    error: ApiError,
}

struct Inner {
    http: Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
    navigator: Option<Arc<dyn Navigator>>,
    refresh_gate: Mutex<Option<FailedRefresh>>,
}

/// Vindex API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the session and
/// the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    session: Arc<SessionStore>,
    navigator: Option<Arc<dyn Navigator>>,
    http: Option<Client>,
}

impl ApiClientBuilder {
    /// Navigator to redirect when the session is forcibly ended.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a preconfigured `reqwest` client.
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be
    /// initialized (e.g., TLS backend failure).
    pub fn build(self) -> Result<ApiClient> {
        let http = match self.http {
            Some(client) => client,
            None => Client::builder()
                .build()
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
        };

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                config: self.config,
                session: self.session,
                navigator: self.navigator,
                refresh_gate: Mutex::new(None),
            }),
        })
    }
}

impl ApiClient {
    /// Start building a client over `session`.
    #[must_use]
    pub const fn builder(config: ClientConfig, session: Arc<SessionStore>) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            session,
            navigator: None,
            http: None,
        }
    }

    /// Client without a navigator.
    ///
    /// # Errors
    ///
    /// Returns errors if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        Self::builder(config, session).build()
    }

    /// Session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Execute a request with bearer authentication and one refresh-retry.
    ///
    /// # Errors
    ///
    /// - `ApiError::Status` for non-2xx responses (including a 401 that
    ///   survived the retry, or a 401 on an unauthenticated call)
    /// - `ApiError::RefreshFailed` if the token refresh failed; the session
    ///   has been logged out
    /// - `ApiError::Transport` / `ApiError::Timeout` for network failures
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut pending = PendingRequest::new(request);

        loop {
            // Outbound: re-read the token on every attempt so a retry uses the rotated one.
            let token = self.inner.session.access_token();
            pending.record_attempt(token.as_deref());

            tracing::debug!(
                method = %pending.request().method,
                path = %pending.request().path,
                authenticated = pending.had_auth(),
                retry = pending.retried(),
                "Sending request"
            );

            let error = match self.dispatch(pending.request(), token.as_deref()).await {
                Ok(response) => {
                    pending.advance(CallState::Done);
                    return Ok(response);
                }
                Err(error) => error,
            };

            // Inbound
            if !pending.should_refresh(&error) {
                pending.advance(CallState::Done);
                return Err(error);
            }

            pending.begin_refresh();
            let sent_token = pending.sent_token().map(str::to_owned);

            match self.refresh(sent_token.as_deref()).await {
                Ok(()) => pending.advance(CallState::Retried),
                Err(RefreshError::MissingToken) => {
                    pending.advance(CallState::LoggedOut);
                    pending.advance(CallState::Done);
                    return Err(error);
                }
                Err(RefreshError::Failed(refresh_error)) => {
                    pending.advance(CallState::LoggedOut);
                    pending.advance(CallState::Done);
                    return Err(ApiError::RefreshFailed(Box::new(refresh_error)));
                }
            }
        }
    }

    /// Execute a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), plus `ApiError::Decode`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Run the refresh protocol for a call that was rejected with `sent_token`.
    ///
    /// On failure the session is already logged out when this returns.
    async fn refresh(&self, sent_token: Option<&str>) -> std::result::Result<(), RefreshError> {
        if !self.inner.config.coalesce_refresh {
            return self.redeem_refresh_token().await;
        }

        // Held until logout completes so waiters never redeem a token that is being discarded.
        let mut last_failure = self.inner.refresh_gate.lock().await;

        match self.inner.session.access_token() {
            Some(current) if Some(current.as_str()) != sent_token => {
                tracing::debug!("Access token already rotated by a concurrent refresh");
                return Ok(());
            }
            None => {
                if let Some(failure) = last_failure
                    .as_ref()
                    .filter(|failure| Some(failure.token.as_str()) == sent_token)
                {
                    tracing::debug!("Concurrent refresh already failed, session ended");
                    return Err(RefreshError::Failed(failure.error.clone()));
                }
            }
            Some(_) => {}
        }

        let result = self.redeem_refresh_token().await;
        *last_failure = match (&result, sent_token) {
            (Err(RefreshError::Failed(error)), Some(token)) => Some(FailedRefresh {
                token: token.to_string(),
                error: error.clone(),
            }),
            _ => None,
        };
        result
    }

    /// Exchange the session's refresh token for a new pair.
    ///
    /// On failure the session is already logged out when this returns.
    async fn redeem_refresh_token(&self) -> std::result::Result<(), RefreshError> {
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            tracing::info!("No refresh token available, ending session");
            self.force_logout();
            return Err(RefreshError::MissingToken);
        };

        match self.request_new_tokens(&refresh_token).await {
            Ok(tokens) => {
                self.inner.session.update_tokens(tokens);
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "Token refresh failed, ending session");
                self.force_logout();
                Err(RefreshError::Failed(error))
            }
        }
    }

    async fn request_new_tokens(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self
            .inner
            .http
            .post(self.inner.config.url(REFRESH_PATH))
            .timeout(self.inner.config.refresh_timeout)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        TokenPair::new(body.access_token, body.refresh_token)
            .ok_or_else(|| ApiError::Decode("refresh response carried an empty token".to_string()))
    }

    fn force_logout(&self) {
        self.inner.session.logout();
        if let Some(navigator) = &self.inner.navigator {
            redirect_to_login(navigator.as_ref());
        }
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.inner.config.url(&request.path))
            .timeout(self.inner.config.request_timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(part) => builder.multipart(multipart_form(part)?),
        };

        let response = builder.send().await.map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| ApiError::from_reqwest(&e))?;
        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn multipart_form(part: &FilePart) -> Result<reqwest::multipart::Form> {
    let file = reqwest::multipart::Part::bytes(part.bytes.clone())
        .file_name(part.file_name.clone())
        .mime_str(&part.content_type)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    Ok(reqwest::multipart::Form::new().part(part.field.clone(), file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let session = Arc::new(SessionStore::in_memory());
        let client = ApiClient::new(ClientConfig::default(), Arc::clone(&session)).unwrap();
        assert_eq!(client.config().base_url, "http://localhost:8080/api");
        assert!(Arc::ptr_eq(client.session(), &session));
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let part = FilePart {
            field: "file".to_string(),
            file_name: "label.png".to_string(),
            content_type: "not a mime".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(multipart_form(&part), Err(ApiError::InvalidRequest(_))));
    }
}
