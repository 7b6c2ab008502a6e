//! # Vindex API Client
//!
//! Rust client library for the Vindex wine cellar service: an authenticated
//! HTTP client with transparent token refresh, a persistent session store,
//! and typed endpoints for the collection, wine discovery and label images.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vindex_client::{ApiClient, ClientConfig, FileStorage, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(FileStorage::new("session.json"));
//!     let session = Arc::new(SessionStore::hydrate(storage));
//!     let client = ApiClient::new(ClientConfig::from_env()?, session)?;
//!
//!     client.auth().login("me@example.com", "secret").await?;
//!     for wine in client.wines().list().await? {
//!         println!("{} ({})", wine.name, wine.vintage.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Refresh protocol
//!
//! ```text
//! request ─► attach bearer ─► backend ─► 2xx ─────────────────────────► caller
//!                                   └─► 401 (had token, first time)
//!                                          └─► POST /auth/refresh
//!                                                ├─ ok   ─► store tokens ─► resend once ─► caller
//!                                                └─ fail ─► logout + /login ─────────────► caller (error)
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod navigation;
pub mod request;
pub mod services;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use client::{ApiClient, ApiClientBuilder};
pub use collection::{paginate, shelf_view, LocationView, Page, Shelf};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use navigation::{MemoryNavigator, Navigator, RouteGuard};
pub use request::{ApiRequest, ApiResponse, CallState, FilePart, PendingRequest, RequestBody};
pub use services::{AuthApi, DiscoveryApi, ImagesApi, RegisterOutcome, WinesApi};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use types::{
    DiscoveredWine, DiscoveryRequest, ImageUpload, Language, RegisterRequest, TokenPair,
    UserProfile, Wine, WineInput, WineLocation, WineSuggestion, WineType,
};
