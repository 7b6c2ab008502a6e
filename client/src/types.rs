//! Wire types for the Vindex backend.
//!
//! Field names follow the backend's camelCase JSON.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Users & Tokens
// ═══════════════════════════════════════════════════════════════════════

/// Preferred interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Hebrew
    He,
}

/// Identity metadata for the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Numeric user id.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Interface language.
    #[serde(default)]
    pub preferred_language: Language,
}

/// Access and refresh token, both non-empty.
///
/// # Examples
///
/// ```
/// # use vindex_client::TokenPair;
/// assert!(TokenPair::new("a", "r").is_some());
/// assert!(TokenPair::new("", "r").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    access_token: String,
    refresh_token: String,
}

impl TokenPair {
    /// Create a pair, or `None` if either token is empty.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        if access_token.is_empty() || refresh_token.is_empty() {
            return None;
        }
        Some(Self {
            access_token,
            refresh_token,
        })
    }

    /// Short-lived bearer credential.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Credential exchanged for a new access token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub(crate) fn into_parts(self) -> (String, String) {
        (self.access_token, self.refresh_token)
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain password.
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Plain password.
    pub password: String,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Login/register response.
///
/// Registration may omit tokens, in which case the user has to log in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Authenticated user.
    pub user: Option<UserProfile>,
    /// Access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthResponse {
    /// Split into a user and a complete token pair, if the response carries both.
    #[must_use]
    pub fn into_credentials(self) -> Option<(UserProfile, TokenPair)> {
        let tokens = TokenPair::new(self.access_token?, self.refresh_token?)?;
        Some((self.user?, tokens))
    }
}

/// `POST /auth/refresh` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// `POST /auth/refresh` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Wines
// ═══════════════════════════════════════════════════════════════════════

/// Wine style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WineType {
    /// Red wine
    Red,
    /// White wine
    White,
    /// Sparkling wine
    Sparkling,
    /// Rosé
    #[serde(alias = "ROSÉ")]
    Rose,
    /// Dessert wine
    Dessert,
    /// Fortified wine
    Fortified,
}

/// Where a bottle is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WineLocation {
    /// Wine fridge
    Fridge,
    /// Cellar
    #[default]
    Cellar,
}

/// A bottle in the user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wine {
    /// Server-assigned id.
    pub id: i64,
    /// Wine name.
    pub name: String,
    /// Style.
    #[serde(rename = "type", default)]
    pub wine_type: Option<WineType>,
    /// Vintage year (free text, e.g. "2019" or "NV").
    #[serde(default)]
    pub vintage: Option<String>,
    /// Number of bottles.
    #[serde(default)]
    pub quantity: u32,
    /// Producer.
    #[serde(default)]
    pub winery: Option<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Label image, relative or absolute.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Storage location; absent means cellar.
    #[serde(default)]
    pub location: Option<WineLocation>,
    /// Shelf row within the location.
    #[serde(default)]
    pub row_id: Option<u32>,
}

/// Body for creating or updating a wine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WineInput {
    /// Wine name.
    pub name: String,
    /// Style.
    #[serde(rename = "type")]
    pub wine_type: Option<WineType>,
    /// Vintage.
    pub vintage: Option<String>,
    /// Number of bottles.
    pub quantity: u32,
    /// Storage location.
    pub location: WineLocation,
    /// Shelf row.
    pub row_id: Option<u32>,
    /// Producer.
    pub winery: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Label image.
    pub image_url: Option<String>,
}

/// Autocomplete entry from `GET /wines/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineSuggestion {
    /// Wine name.
    pub name: String,
    /// Style as sent by the server.
    #[serde(rename = "type", default)]
    pub wine_type: Option<String>,
    /// Vintage.
    #[serde(default)]
    pub vintage: Option<String>,
    /// Producer.
    #[serde(default)]
    pub winery: Option<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Label image.
    #[serde(default)]
    pub image_url: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Discovery & Images
// ═══════════════════════════════════════════════════════════════════════

/// `POST /wine-discovery/discover` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    /// Producer name.
    pub winery: String,
    /// Wine name.
    pub wine_name: String,
    /// Vintage, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vintage: Option<String>,
}

/// A wine from the shared database or the external lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredWine {
    /// Id in the shared database.
    #[serde(default)]
    pub id: Option<i64>,
    /// Producer.
    pub winery: String,
    /// Wine name.
    pub wine_name: String,
    /// Vintage.
    #[serde(default)]
    pub vintage: Option<String>,
    /// Style.
    #[serde(rename = "type", default)]
    pub wine_type: Option<String>,
    /// Grape varieties.
    #[serde(default)]
    pub grapes: Vec<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Alcohol by volume, percent.
    #[serde(default)]
    pub alcohol_content: Option<f64>,
    /// Where the data came from.
    #[serde(default)]
    pub source: Option<String>,
    /// Whether the entry was validated.
    #[serde(default)]
    pub ai_validated: Option<bool>,
    /// Creation time (server local time).
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Response of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    /// URL of the stored image.
    pub image_url: String,
}
