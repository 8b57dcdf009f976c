use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use http::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::{ClearOnDrop, SessionService};
use crate::client::endpoints::AUTH_PROFILE;
use crate::client::{SessionInvalidated, SessionInvalidationHandler};
use crate::error::{Error, Result, UnauthenticatedReason};
use crate::models::{Registration, Role, Session, UserProfile};
use crate::store::TokenStore;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// MockSessionConfig lists the accounts the mock backend accepts.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, Default)]
pub struct MockSessionConfig {
    #[serde(default)]
    pub users: Vec<MockUserEntry>,
}

/// A single account (username + password + role).
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct MockUserEntry {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Default)]
struct MockState {
    users: Vec<MockUserEntry>,
    /// Issued token -> index into `users`.
    issued: HashMap<String, usize>,
}

/// A session service that never leaves the process: credentials are checked
/// against a fixed list and tokens are random UUIDs.
pub struct MockSessionService {
    tokens: TokenStore,
    state: Mutex<MockState>,
    invalidation_handler: Option<Arc<dyn SessionInvalidationHandler>>,
}

impl MockSessionService {
    pub fn new(config: &MockSessionConfig, tokens: TokenStore) -> Self {
        MockSessionService {
            tokens,
            state: Mutex::new(MockState {
                users: config.users.clone(),
                issued: HashMap::new(),
            }),
            invalidation_handler: None,
        }
    }

    pub fn with_invalidation_handler(
        mut self,
        handler: Arc<dyn SessionInvalidationHandler>,
    ) -> Self {
        self.invalidation_handler = Some(handler);
        self
    }

    /// Same contract as a 401 from the remote API: drop the stored session
    /// and tell the boundary once.
    fn reject_session(&self) -> Error {
        warn!(
            event_name = "http.session.invalidated",
            "Mock backend does not recognise the stored token; clearing it"
        );
        self.tokens.clear();
        if let Some(handler) = &self.invalidation_handler {
            handler.on_session_invalidated(&SessionInvalidated {
                method: Method::GET,
                path: AUTH_PROFILE.to_string(),
            });
        }
        Error::Unauthenticated(UnauthenticatedReason::TokenRejected)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn profile_for(index: usize, entry: &MockUserEntry) -> UserProfile {
        UserProfile {
            id: (index + 1).to_string(),
            username: entry.username.clone(),
            email: entry.email.clone(),
            full_name: None,
            role: entry.role.as_str().to_string(),
            created_at: None,
            last_login: None,
        }
    }
}

#[async_trait]
impl SessionService for MockSessionService {
    fn get_name(&self) -> &str {
        "mock"
    }

    fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Auth(
                "username and password are required".to_string(),
            ));
        }

        let session = {
            let mut state = self.state();
            let found = state
                .users
                .iter()
                .position(|entry| entry.username == username && entry.password == password);
            let index = match found {
                Some(index) => index,
                None => {
                    debug!("Mock login rejected for '{}'", username);
                    return Err(Error::Auth("wrong username or password".to_string()));
                }
            };
            let entry = &state.users[index];
            let session = Session {
                token: uuid::Uuid::new_v4().to_string(),
                user_id: (index + 1).to_string(),
                username: entry.username.clone(),
                email: entry.email.clone().unwrap_or_default(),
                role: entry.role,
            };
            if let Some(previous) = self.tokens.token() {
                state.issued.remove(&previous);
            }
            state.issued.insert(session.token.clone(), index);
            session
        };

        self.tokens.set(&session)?;
        info!("Mock login for '{}' as '{}'", session.username, session.role);
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<String> {
        let username = registration.username.trim();
        let email = registration.email.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(Error::Auth(format!(
                "username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Auth(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut state = self.state();
        let taken = state.users.iter().any(|entry| {
            entry.username == username || (!email.is_empty() && entry.email.as_deref() == Some(email))
        });
        if taken {
            return Err(Error::Auth("username or email already exists".to_string()));
        }

        state.users.push(MockUserEntry {
            username: username.to_string(),
            password: registration.password.clone(),
            role: registration.role,
            email: Some(email.to_string()).filter(|e| !e.is_empty()),
        });
        info!("Mock registration for '{}'", username);
        Ok("registration succeeded".to_string())
    }

    async fn logout(&self) {
        let _clear = ClearOnDrop(&self.tokens);
        if let Some(token) = self.tokens.token() {
            if self.state().issued.remove(&token).is_none() {
                warn!("Logging out a token the mock backend never issued");
            }
        }
    }

    async fn get_profile(&self) -> Result<UserProfile> {
        let token = self
            .tokens
            .token()
            .ok_or(Error::Unauthenticated(UnauthenticatedReason::NoToken))?;
        let profile = {
            let state = self.state();
            state.issued.get(&token).and_then(|&index| {
                state
                    .users
                    .get(index)
                    .map(|entry| Self::profile_for(index, entry))
            })
        };
        profile.ok_or_else(|| self.reject_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn create_test_config() -> MockSessionConfig {
        MockSessionConfig {
            users: vec![
                MockUserEntry {
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                    role: Role::Admin,
                    email: Some("admin@example.org".to_string()),
                },
                MockUserEntry {
                    username: "teacher1".to_string(),
                    password: "password1".to_string(),
                    role: Role::User,
                    email: None,
                },
                MockUserEntry {
                    username: "student1".to_string(),
                    password: "password2".to_string(),
                    role: Role::Viewer,
                    email: Some("student1@example.org".to_string()),
                },
            ],
        }
    }

    fn service() -> MockSessionService {
        MockSessionService::new(
            &create_test_config(),
            TokenStore::new(Arc::new(MemoryStore::new())),
        )
    }

    /// Valid credentials produce a stored session with the configured role.
    #[tokio::test]
    async fn test_login_valid_credentials() {
        let service = service();
        let session = service.login("teacher1", "password1").await.unwrap();

        assert_eq!(session.username, "teacher1");
        assert_eq!(session.role, Role::User);
        assert_eq!(session.user_id, "2");
        assert!(!session.token.is_empty());
        assert_eq!(service.token_store().get(), Some(session));
        assert!(service.is_user());
        assert!(!service.is_admin());
    }

    /// A wrong password leaves the store untouched.
    #[tokio::test]
    async fn test_login_invalid_password() {
        let service = service();
        let err = service.login("admin", "wrong-pass").await.unwrap_err();

        assert_eq!(err.to_string(), "wrong username or password");
        assert!(!service.is_authenticated());
    }

    /// Usernames are case sensitive.
    #[tokio::test]
    async fn test_login_case_sensitivity() {
        let service = service();
        assert!(service.login("ADMIN", "admin123").await.is_err());
        assert!(service.login("admin", "ADMIN123").await.is_err());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let service = service();
        let err = service.login("  ", "admin123").await.unwrap_err();
        assert_eq!(err.to_string(), "username and password are required");
    }

    /// Each login issues a fresh token and overwrites the previous session.
    #[tokio::test]
    async fn test_second_login_overwrites_session() {
        let service = service();
        let first = service.login("admin", "admin123").await.unwrap();
        let second = service.login("student1", "password2").await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(service.token_store().get(), Some(second));
        assert!(service.is_viewer());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let message = service
            .register(&Registration::new("newbie", "newbie@example.org", "secret1"))
            .await
            .unwrap();
        assert_eq!(message, "registration succeeded");
        assert!(!service.is_authenticated());

        let session = service.login("newbie", "secret1").await.unwrap();
        assert_eq!(session.role, Role::User);
        assert_eq!(session.email, "newbie@example.org");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service();
        let short_name = service
            .register(&Registration::new("ab", "ab@example.org", "secret1"))
            .await
            .unwrap_err();
        assert!(short_name.to_string().contains("username"));

        let short_password = service
            .register(&Registration::new("abc", "abc@example.org", "12345"))
            .await
            .unwrap_err();
        assert!(short_password.to_string().contains("password"));

        let duplicate = service
            .register(&Registration::new("other", "admin@example.org", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(duplicate.to_string(), "username or email already exists");
    }

    #[tokio::test]
    async fn test_logout_clears_and_revokes() {
        let service = service();
        let session = service.login("admin", "admin123").await.unwrap();
        service.logout().await;

        assert!(!service.is_authenticated());
        // A stale copy of the token is no longer recognised.
        service.token_store().set(&session).unwrap();
        assert!(matches!(
            service.get_profile().await,
            Err(Error::Unauthenticated(UnauthenticatedReason::TokenRejected))
        ));
    }

    #[tokio::test]
    async fn test_profile() {
        let service = service();
        assert!(matches!(
            service.get_profile().await,
            Err(Error::Unauthenticated(UnauthenticatedReason::NoToken))
        ));

        service.login("student1", "password2").await.unwrap();
        let profile = service.get_profile().await.unwrap();
        assert_eq!(profile.username, "student1");
        assert_eq!(profile.id, "3");
        assert_eq!(profile.role(), Some(Role::Viewer));
    }

    #[tokio::test]
    async fn test_current_user() {
        let service = service();
        assert!(service.current_user().is_none());
        service.login("admin", "admin123").await.unwrap();
        assert_eq!(
            service.current_user().map(|s| s.username),
            Some("admin".to_string())
        );
    }

    #[derive(Default)]
    struct CountingHandler {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl SessionInvalidationHandler for CountingHandler {
        fn on_session_invalidated(&self, event: &SessionInvalidated) {
            assert_eq!(event.path, AUTH_PROFILE);
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    /// A stored token the backend never issued is dropped like a 401.
    #[tokio::test]
    async fn test_unknown_token_clears_session() {
        let handler = Arc::new(CountingHandler::default());
        let service = service().with_invalidation_handler(handler.clone());
        service
            .token_store()
            .set(&Session {
                token: "stale".to_string(),
                user_id: "1".to_string(),
                username: "admin".to_string(),
                email: String::new(),
                role: Role::Admin,
            })
            .unwrap();

        let err = service.get_profile().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Unauthenticated(UnauthenticatedReason::TokenRejected)
        ));
        assert!(!service.is_authenticated());
        assert!(!service.is_admin());
        assert_eq!(handler.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    /// Re-login retires the token it replaces.
    #[tokio::test]
    async fn test_relogin_retires_previous_token() {
        let service = service();
        let first = service.login("admin", "admin123").await.unwrap();
        service.login("admin", "admin123").await.unwrap();
        service.login("student1", "password2").await.unwrap();

        assert_eq!(service.state().issued.len(), 1);
        assert!(!service.state().issued.contains_key(&first.token));
    }
}
