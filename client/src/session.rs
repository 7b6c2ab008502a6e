//! Session store.
//!
//! Holds the authentication state of the running application (user plus
//! token pair) and mirrors it into a [`KeyValueStorage`].
//!
//! # Consistency
//!
//! The state lives in a `tokio::sync::watch` channel. Every mutator replaces
//! it in one step, so a synchronous reader sees either the old session or the
//! new one, never a mix. Persistence is best-effort: storage failures are
//! logged and the in-memory session stays the source of truth.

use crate::storage::{
    KeyValueStorage, StorageError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};
use crate::types::{TokenPair, UserProfile};
use std::sync::Arc;
use tokio::sync::watch;

/// Authentication state.
///
/// # Examples
///
/// ```
/// # use vindex_client::Session;
/// let session = Session::default();
/// assert!(!session.is_authenticated());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Logged-in user.
    pub user: Option<UserProfile>,
    /// Current bearer credential.
    pub access_token: Option<String>,
    /// Credential used to mint a new access token.
    pub refresh_token: Option<String>,
}

impl Session {
    /// `true` iff an access token is present and non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

/// Process-wide session, shared behind an `Arc`.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Load the session persisted in `storage`.
    ///
    /// Starts logged out if storage fails, if any of the three keys is
    /// missing, or if the stored user does not parse. Leftover keys of an
    /// incomplete session are removed.
    #[must_use]
    pub fn hydrate(storage: Arc<dyn KeyValueStorage>) -> Self {
        let session = load(storage.as_ref());
        tracing::debug!(
            authenticated = session.is_authenticated(),
            "Hydrated session from storage"
        );

        let (state, _) = watch::channel(session);
        Self { storage, state }
    }

    /// Session backed by throwaway in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::hydrate(Arc::new(crate::storage::MemoryStorage::new()))
    }

    // ═══════════════════════════════════════════════════════════
    // Mutators
    // ═══════════════════════════════════════════════════════════

    /// Log in: store user and both tokens.
    pub fn set_auth(&self, user: UserProfile, tokens: TokenPair) {
        self.persist_user(&user);
        self.persist(ACCESS_TOKEN_KEY, tokens.access_token());
        self.persist(REFRESH_TOKEN_KEY, tokens.refresh_token());

        let user_id = user.id;
        let (access_token, refresh_token) = tokens.into_parts();
        self.state.send_replace(Session {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        });

        tracing::info!(user_id, "Session established");
    }

    /// Log out: clear user and tokens.
    ///
    /// Calling this on a logged-out session changes nothing and notifies no
    /// subscriber.
    pub fn logout(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                log_storage_failure(key, &e);
            }
        }

        let changed = self.state.send_if_modified(|session| {
            if *session == Session::default() {
                return false;
            }
            *session = Session::default();
            true
        });

        if changed {
            tracing::info!("Session cleared");
        }
    }

    /// Replace the stored user profile; tokens are untouched.
    pub fn set_user(&self, user: UserProfile) {
        self.persist_user(&user);
        self.state.send_modify(|session| session.user = Some(user));
    }

    /// Install a rotated token pair, keeping the user.
    pub(crate) fn update_tokens(&self, tokens: TokenPair) {
        self.persist(ACCESS_TOKEN_KEY, tokens.access_token());
        self.persist(REFRESH_TOKEN_KEY, tokens.refresh_token());

        let (access_token, refresh_token) = tokens.into_parts();
        self.state.send_modify(|session| {
            session.access_token = Some(access_token);
            session.refresh_token = Some(refresh_token);
        });

        tracing::debug!("Session tokens rotated");
    }

    // ═══════════════════════════════════════════════════════════
    // Readers
    // ═══════════════════════════════════════════════════════════

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
    }

    /// Current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .borrow()
            .refresh_token
            .clone()
            .filter(|token| !token.is_empty())
    }

    /// Current user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    /// Whether an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Observe session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            log_storage_failure(key, &e);
        }
    }

    fn persist_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(json) => self.persist(USER_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to encode user profile"),
        }
    }
}

fn log_storage_failure(key: &str, error: &StorageError) {
    tracing::warn!(key, error = %error, "Session storage not available");
}

fn load(storage: &dyn KeyValueStorage) -> Session {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            log_storage_failure(key, &e);
            None
        }
    };

    let access_token = read(ACCESS_TOKEN_KEY);
    let refresh_token = read(REFRESH_TOKEN_KEY);
    let user = read(USER_KEY).and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable stored user");
            None
        }
    });

    match (user, access_token, refresh_token) {
        (Some(user), Some(access_token), Some(refresh_token)) => Session {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        },
        (None, None, None) => Session::default(),
        _ => {
            tracing::warn!("Stored session is incomplete, starting logged out");
            for key in SESSION_KEYS {
                if let Err(e) = storage.remove(key) {
                    log_storage_failure(key, &e);
                }
            }
            Session::default()
        }
    }
}
