//! Authentication endpoints.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{AuthResponse, Language, LoginRequest, RegisterRequest, UserProfile};

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "/auth/login";
/// Path of the registration endpoint.
pub const REGISTER_PATH: &str = "/auth/register";

/// Result of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Backend returned tokens; the session is established
    LoggedIn(UserProfile),
    /// Account created without tokens; the user has to log in
    LoginRequired,
}

/// Authentication API.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in and establish the session.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` if email or password is blank
    /// - `ApiError::Status` for rejected credentials
    /// - `ApiError::Decode` if the response lacks the user or a token
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("email and password are required".to_string()));
        }

        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let response: AuthResponse = self.client.execute_json(request).await?;

        let (user, tokens) = response
            .into_credentials()
            .ok_or_else(|| ApiError::Decode("login response missing user or tokens".to_string()))?;

        self.client.session().set_auth(user.clone(), tokens);
        Ok(user)
    }

    /// Create an account.
    ///
    /// Establishes the session when the backend returns tokens.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` if username, email or password is blank
    /// - `ApiError::Status` if the backend rejects the registration
    pub async fn register(&self, registration: &RegisterRequest) -> Result<RegisterOutcome> {
        if registration.username.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(ApiError::Validation(
                "username, email and password are required".to_string(),
            ));
        }

        let request = ApiRequest::post(REGISTER_PATH).json(registration)?;
        let response: AuthResponse = self.client.execute_json(request).await?;

        Ok(match response.into_credentials() {
            Some((user, tokens)) => {
                self.client.session().set_auth(user.clone(), tokens);
                RegisterOutcome::LoggedIn(user)
            }
            None => RegisterOutcome::LoginRequired,
        })
    }

    /// End the session locally.
    pub fn logout(&self) {
        self.client.session().logout();
    }

    /// Change the stored user's interface language.
    ///
    /// Returns the updated profile, or `None` when nobody is logged in.
    pub fn set_preferred_language(&self, language: Language) -> Option<UserProfile> {
        let mut user = self.client.session().user()?;
        user.preferred_language = language;
        self.client.session().set_user(user.clone());
        Some(user)
    }
}
