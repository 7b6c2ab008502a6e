//! Wine discovery endpoints.
//!
//! `discover` asks the backend to look a wine up (shared database first, then
//! the external service); the search endpoints only read the shared database.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{DiscoveredWine, DiscoveryRequest};

/// Base path of the discovery endpoints.
pub const DISCOVERY_PATH: &str = "/wine-discovery";

/// Discovery API.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DiscoveryApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Look up details for a winery + wine name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if winery or wine name is blank,
    /// otherwise errors from the request or from decoding.
    pub async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveredWine> {
        if request.winery.trim().is_empty() || request.wine_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "winery and wine name are required".to_string(),
            ));
        }

        let request = ApiRequest::post(format!("{DISCOVERY_PATH}/discover")).json(request)?;
        self.client.execute_json(request).await
    }

    /// Fetch one shared-database entry.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn get(&self, id: i64) -> Result<DiscoveredWine> {
        self.client
            .execute_json(ApiRequest::get(format!("{DISCOVERY_PATH}/{id}")))
            .await
    }

    /// Shared-database wines by winery name.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn search_by_winery(&self, winery: &str) -> Result<Vec<DiscoveredWine>> {
        self.client
            .execute(ApiRequest::get(format!("{DISCOVERY_PATH}/search/winery")).query("name", winery))
            .await?
            .json_list()
    }

    /// Shared-database wines by wine name.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<DiscoveredWine>> {
        self.client
            .execute(ApiRequest::get(format!("{DISCOVERY_PATH}/search/name")).query("query", name))
            .await?
            .json_list()
    }

    /// Every validated shared-database wine.
    ///
    /// # Errors
    ///
    /// Returns errors from the request or from decoding.
    pub async fn validated(&self) -> Result<Vec<DiscoveredWine>> {
        self.client
            .execute(ApiRequest::get(format!("{DISCOVERY_PATH}/validated")))
            .await?
            .json_list()
    }
}
