//! Navigation and the login route guard.
//!
//! The client never renders anything itself; it asks a [`Navigator`] to move
//! to the login surface when the session ends. Front ends implement the trait
//! over whatever router they use.

use crate::session::SessionStore;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Path of the login surface.
pub const LOGIN_PATH: &str = "/login";
/// Path of the registration surface.
pub const REGISTER_PATH: &str = "/register";

/// Routing capability of the front end.
pub trait Navigator: Send + Sync {
    /// Path currently shown.
    fn current_path(&self) -> String;

    /// Move to `path`, replacing the current entry.
    fn navigate(&self, path: &str);
}

/// `true` for surfaces reachable without a session.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    path == LOGIN_PATH || path == REGISTER_PATH
}

/// Send the user to the login surface unless they are already on a public one.
///
/// Returns `true` if a navigation happened.
pub fn redirect_to_login(navigator: &dyn Navigator) -> bool {
    let current = navigator.current_path();
    if is_public_path(&current) {
        return false;
    }

    tracing::info!(from = %current, "Redirecting to login");
    navigator.navigate(LOGIN_PATH);
    true
}

/// Watches the session and redirects to login whenever it ends.
#[derive(Debug)]
pub struct RouteGuard {
    handle: JoinHandle<()>,
}

impl RouteGuard {
    /// Start guarding. Must be called inside a Tokio runtime.
    ///
    /// If the session is already logged out, the first redirect happens
    /// immediately.
    #[must_use]
    pub fn spawn(session: &SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let mut changes = session.subscribe();

        let handle = tokio::spawn(async move {
            let mut was_authenticated = changes.borrow_and_update().is_authenticated();
            if !was_authenticated {
                redirect_to_login(navigator.as_ref());
            }

            while changes.changed().await.is_ok() {
                let authenticated = changes.borrow_and_update().is_authenticated();
                if was_authenticated && !authenticated {
                    redirect_to_login(navigator.as_ref());
                }
                was_authenticated = authenticated;
            }
        });

        Self { handle }
    }

    /// Stop guarding.
    pub fn stop(self) {
        self.handle.abort();
    }
}

/// In-process navigator recording every visited path.
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemoryNavigator {
    /// Navigator positioned at `path`.
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![path.into()])),
        }
    }

    /// Every path visited, oldest first, including the starting one.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
