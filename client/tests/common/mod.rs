//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use vindex_client::mocks::sample_user;
use vindex_client::{
    ApiClient, ClientConfig, KeyValueStorage, MemoryNavigator, MemoryStorage, SessionStore,
    TokenPair,
};
use wiremock::MockServer;

/// Everything a test needs to drive and inspect one client.
pub struct Harness {
    pub client: ApiClient,
    pub session: Arc<SessionStore>,
    pub storage: MemoryStorage,
    pub navigator: MemoryNavigator,
}

/// Configuration pointing at the mock server's `/api`.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api", server.uri()))
        .with_request_timeout(Duration::from_secs(2))
        .with_refresh_timeout(Duration::from_millis(500))
}

/// Client on `/cellar`, logged in with `access`/`refresh` when given.
pub fn harness(config: ClientConfig, tokens: Option<(&str, &str)>) -> Harness {
    let storage = MemoryStorage::new();
    let session = Arc::new(SessionStore::hydrate(Arc::new(storage.clone())));
    if let Some((access, refresh)) = tokens {
        session.set_auth(sample_user(), TokenPair::new(access, refresh).unwrap());
    }

    let navigator = MemoryNavigator::at("/cellar");
    let client = ApiClient::builder(config, Arc::clone(&session))
        .navigator(Arc::new(navigator.clone()))
        .build()
        .unwrap();

    Harness {
        client,
        session,
        storage,
        navigator,
    }
}

/// Logged-in client with default test configuration.
pub fn logged_in(server: &MockServer, access: &str, refresh: &str) -> Harness {
    harness(config_for(server), Some((access, refresh)))
}

/// Logged-out client with default test configuration.
pub fn logged_out(server: &MockServer) -> Harness {
    harness(config_for(server), None)
}

/// Whether the persisted session keys are all gone.
pub fn storage_cleared(storage: &MemoryStorage) -> bool {
    ["user", "accessToken", "refreshToken"]
        .iter()
        .all(|key| storage.get(key).unwrap().is_none())
}
