//! Mock implementations for testing.
//!
//! Simple, in-memory stand-ins for the capabilities the client depends on,
//! for use in unit and integration tests.

pub mod storage;

pub use storage::UnavailableStorage;

use crate::types::{Language, UserProfile};

/// A fixed user profile for tests.
#[must_use]
pub fn sample_user() -> UserProfile {
    UserProfile {
        id: 1,
        username: "cellarmaster".to_string(),
        email: "cellarmaster@example.com".to_string(),
        first_name: Some("Dana".to_string()),
        last_name: None,
        preferred_language: Language::En,
    }
}
