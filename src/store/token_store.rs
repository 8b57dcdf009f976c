//! Scoped accessors over the key-value store for the current session.

use std::sync::Arc;

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::Result;
use crate::models::{Role, Session};

pub const TOKEN_KEY: &str = "access_token";
pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
pub const ROLE_KEY: &str = "user_role";
pub const EMAIL_KEY: &str = "user_email";

/// Keys written by older client builds. Never written, always cleared.
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const LEGACY_KEYS: [&str; 3] = [LEGACY_TOKEN_KEY, "isAuthenticated", "userRole"];

const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, USER_ID_KEY, USERNAME_KEY, ROLE_KEY, EMAIL_KEY];

/// Handle to the stored session. Cheap to clone; all clones share storage.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        TokenStore { backend }
    }

    /// Replace the stored session as one unit.
    pub fn set(&self, session: &Session) -> Result<()> {
        self.backend.set_items(&[
            (TOKEN_KEY, session.token.clone()),
            (USER_ID_KEY, session.user_id.clone()),
            (USERNAME_KEY, session.username.clone()),
            (ROLE_KEY, session.role.as_str().to_string()),
            (EMAIL_KEY, session.email.clone()),
        ])?;
        // Keys from older builds must not outlive a fresh login.
        self.backend.remove_items(&LEGACY_KEYS);
        debug!(
            "Stored session for '{}' (role={}, token={})",
            session.username,
            session.role,
            session.token_preview()
        );
        Ok(())
    }

    /// The stored bearer token, if any. Empty strings count as absent.
    pub fn token(&self) -> Option<String> {
        self.backend
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .or_else(|| self.backend.get_item(LEGACY_TOKEN_KEY))
            .filter(|token| !token.is_empty())
    }

    /// The stored role. Inert without a token: returns `None` in that case.
    pub fn role(&self) -> Option<Role> {
        self.token()?;
        let raw = self.backend.get_item(ROLE_KEY)?;
        match raw.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("Ignoring stored role: {}", e);
                None
            }
        }
    }

    /// The full session, or `None` if no token or no valid role is stored.
    pub fn get(&self) -> Option<Session> {
        let token = self.token()?;
        let role = self.role()?;
        Some(Session {
            token,
            user_id: self.backend.get_item(USER_ID_KEY).unwrap_or_default(),
            username: self.backend.get_item(USERNAME_KEY).unwrap_or_default(),
            email: self.backend.get_item(EMAIL_KEY).unwrap_or_default(),
            role,
        })
    }

    /// Remove every session key, legacy names included. Idempotent.
    pub fn clear(&self) {
        let keys: Vec<&str> = SESSION_KEYS.iter().chain(LEGACY_KEYS.iter()).copied().collect();
        self.backend.remove_items(&keys);
        debug!("Cleared stored session from '{}' store", self.backend.get_name());
    }
}
