//! Label image endpoints.

use super::wines::PLACEHOLDER_IMAGE;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::request::{ApiRequest, FilePart};
use crate::types::ImageUpload;

/// Base path of the image endpoints.
pub const IMAGES_PATH: &str = "/wine-images";

/// Largest accepted upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted upload types.
pub const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

impl FilePart {
    /// Image in the `file` form field.
    #[must_use]
    pub fn image(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Check an upload before sending it.
///
/// # Errors
///
/// Returns `ApiError::Validation` for an unsupported type or a file over
/// [`MAX_IMAGE_BYTES`].
pub fn validate_image(content_type: &str, size: usize) -> Result<()> {
    if !IMAGE_TYPES.contains(&content_type) {
        return Err(ApiError::Validation(
            "Invalid file type. Please upload JPG, PNG, GIF, or WebP images.".to_string(),
        ));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ApiError::Validation("File size exceeds 5MB limit.".to_string()));
    }
    Ok(())
}

/// Resolve a stored image reference to a URL a front end can load.
///
/// - absent → the placeholder
/// - absolute `http(s)` URL → unchanged
/// - `/path` → served from the backend origin
/// - anything else → relative to the API base
#[must_use]
pub fn image_url(config: &ClientConfig, image: Option<&str>) -> String {
    match image.filter(|i| !i.is_empty()) {
        None => PLACEHOLDER_IMAGE.to_string(),
        Some(url) if url.starts_with("http") => url.to_string(),
        Some(path) if path.starts_with('/') => format!("{}{path}", config.origin()),
        Some(path) => config.url(path),
    }
}

/// Image API.
#[derive(Debug, Clone, Copy)]
pub struct ImagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ImagesApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Upload a label for a wine.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before sending if the file is rejected
    /// by [`validate_image`], otherwise errors from the request.
    pub async fn upload(&self, wine_id: i64, file: FilePart) -> Result<ImageUpload> {
        validate_image(&file.content_type, file.bytes.len())?;

        let request = ApiRequest::post(format!("{IMAGES_PATH}/upload/{wine_id}")).multipart(file);
        self.client.execute_json(request).await
    }

    /// Remove a wine's label.
    ///
    /// # Errors
    ///
    /// Returns errors from the request.
    pub async fn delete(&self, wine_id: i64) -> Result<()> {
        self.client
            .execute(ApiRequest::delete(format!("{IMAGES_PATH}/{wine_id}")))
            .await?;
        Ok(())
    }

    /// [`image_url`] against this client's configuration.
    #[must_use]
    pub fn url_for(&self, image: Option<&str>) -> String {
        image_url(self.client.config(), image)
    }
}
