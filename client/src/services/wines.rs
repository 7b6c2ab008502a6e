//! Collection endpoints.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{Wine, WineInput, WineLocation, WineSuggestion, WineType};

/// Base path of the collection.
pub const WINES_PATH: &str = "/wines";

/// Suggestions are only requested for queries at least this long.
pub const MIN_SUGGESTION_QUERY: usize = 2;

/// Placeholder label used when a wine has no image.
pub const PLACEHOLDER_IMAGE: &str = "/wine-placeholder.svg";

impl WineInput {
    /// Minimal input: one bottle in the cellar.
    #[must_use]
    pub fn new(name: impl Into<String>, wine_type: WineType, vintage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wine_type: Some(wine_type),
            vintage: Some(vintage.into()),
            quantity: 1,
            location: WineLocation::Cellar,
            row_id: None,
            winery: None,
            region: None,
            country: None,
            image_url: None,
        }
    }

    /// Input that edits `wine`, keeping the fields a form does not touch.
    #[must_use]
    pub fn from_wine(wine: &Wine) -> Self {
        Self {
            name: wine.name.clone(),
            wine_type: wine.wine_type,
            vintage: wine.vintage.clone(),
            quantity: wine.quantity,
            location: wine.location.unwrap_or_default(),
            row_id: wine.row_id,
            winery: wine.winery.clone(),
            region: wine.region.clone(),
            country: wine.country.clone(),
            image_url: wine.image_url.clone(),
        }
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming every missing field.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.wine_type.is_none() {
            missing.push("type");
        }
        if self.vintage.as_deref().is_none_or(|v| v.trim().is_empty()) {
            missing.push("vintage");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(format!("required: {}", missing.join(", "))))
        }
    }

    /// Trimmed copy with at least one bottle and a label image.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            vintage: self.vintage.as_ref().map(|v| v.trim().to_string()),
            quantity: self.quantity.max(1),
            image_url: self
                .image_url
                .clone()
                .or_else(|| Some(PLACEHOLDER_IMAGE.to_string())),
            ..self.clone()
        }
    }
}

/// Collection API.
#[derive(Debug, Clone, Copy)]
pub struct WinesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WinesApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All wines of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn list(&self) -> Result<Vec<Wine>> {
        self.client
            .execute(ApiRequest::get(WINES_PATH))
            .await?
            .json_list()
    }

    /// Look up one wine of the collection.
    ///
    /// The backend has no single-wine endpoint, so this scans the list.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn find(&self, id: i64) -> Result<Option<Wine>> {
        Ok(self.list().await?.into_iter().find(|wine| wine.id == id))
    }

    /// Add a wine.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before sending if required fields are
    /// missing, otherwise errors from the request.
    pub async fn create(&self, input: &WineInput) -> Result<Wine> {
        input.validate()?;
        let request = ApiRequest::post(WINES_PATH).json(&input.normalized())?;
        self.client.execute_json(request).await
    }

    /// Replace a wine.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub async fn update(&self, id: i64, input: &WineInput) -> Result<Wine> {
        input.validate()?;
        let request = ApiRequest::put(format!("{WINES_PATH}/{id}")).json(&input.normalized())?;
        self.client.execute_json(request).await
    }

    /// Delete a wine.
    ///
    /// # Errors
    ///
    /// Returns errors from the request.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .execute(ApiRequest::delete(format!("{WINES_PATH}/{id}")))
            .await?;
        Ok(())
    }

    /// Autocomplete from the shared database.
    ///
    /// Queries shorter than two characters (after trimming) return nothing
    /// without hitting the backend.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<WineSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Ok(Vec::new());
        }

        self.client
            .execute(ApiRequest::get(format!("{WINES_PATH}/search")).query("query", query))
            .await?
            .json_list()
    }
}
