//! Typed endpoints of the Vindex backend.
//!
//! Each service borrows an [`ApiClient`] and goes through its interceptor,
//! so every call is authenticated and refresh-aware.

pub mod auth;
pub mod discovery;
pub mod images;
pub mod wines;

pub use auth::{AuthApi, RegisterOutcome};
pub use discovery::DiscoveryApi;
pub use images::ImagesApi;
pub use wines::WinesApi;

use crate::client::ApiClient;

impl ApiClient {
    /// Login, registration and profile.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// The user's collection.
    #[must_use]
    pub const fn wines(&self) -> WinesApi<'_> {
        WinesApi::new(self)
    }

    /// Shared wine database and external lookup.
    #[must_use]
    pub const fn discovery(&self) -> DiscoveryApi<'_> {
        DiscoveryApi::new(self)
    }

    /// Label images.
    #[must_use]
    pub const fn images(&self) -> ImagesApi<'_> {
        ImagesApi::new(self)
    }
}
