use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::mock_session::{MockSessionConfig, MockSessionService};
use super::remote_session::RemoteSessionService;
use crate::client::HttpClient;
use crate::error::{Error, Result, UnauthenticatedReason};
use crate::models::{Registration, Role, Session, UserProfile};
use crate::store::TokenStore;

pub const LOGIN_FAILED: &str = "login failed: invalid credentials";
pub const REGISTER_FAILED: &str = "registration failed";
pub const NETWORK_FAILURE: &str = "network failure, please try again";

/// Selects the session implementation. Differentiated by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
#[serde(tag = "type")]
pub enum SessionBackendConfig {
    /// Talks to the API's `/auth/*` endpoints.
    #[serde(rename = "remote")]
    #[default]
    Remote,
    /// Fixed in-memory credential list, for demos and tests.
    #[serde(rename = "mock")]
    Mock(MockSessionConfig),
}

/// Login, registration and identity operations.
///
/// Implementations are the only writers of the token store on success paths.
/// The role predicates are synchronous reads of the store and never touch
/// the network.
#[async_trait]
pub trait SessionService: Send + Sync {
    fn get_name(&self) -> &str;
    fn token_store(&self) -> &TokenStore;

    /// Exchange credentials for a session and persist it. On failure the
    /// store is left exactly as it was.
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Create an account; returns the server's confirmation message.
    /// Never touches the store.
    async fn register(&self, registration: &Registration) -> Result<String>;

    /// Best-effort server notification, then an unconditional local clear.
    async fn logout(&self);

    async fn get_profile(&self) -> Result<UserProfile>;

    fn is_authenticated(&self) -> bool {
        self.token_store().token().is_some()
    }

    fn current_user(&self) -> Option<Session> {
        if !self.is_authenticated() {
            return None;
        }
        self.token_store().get()
    }

    fn has_role(&self, role: Role) -> bool {
        self.token_store().role() == Some(role)
    }

    fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    fn is_user(&self) -> bool {
        self.has_role(Role::User)
    }

    fn is_viewer(&self) -> bool {
        self.has_role(Role::Viewer)
    }

    /// Gate for role-restricted actions outside navigation.
    fn require_role(&self, role: Role) -> Result<()> {
        if !self.is_authenticated() {
            return Err(Error::Unauthenticated(UnauthenticatedReason::NoToken));
        }
        if !self.has_role(role) {
            return Err(Error::Unauthorized(format!("the '{}' role is required", role)));
        }
        Ok(())
    }
}

/// Create the configured session service on top of `http`.
pub fn create_session_service(
    config: &SessionBackendConfig,
    http: Arc<HttpClient>,
) -> Arc<dyn SessionService> {
    match config {
        SessionBackendConfig::Remote => {
            info!("Using remote session service at {}", http.base_url());
            Arc::new(RemoteSessionService::new(http))
        }
        SessionBackendConfig::Mock(cfg) => {
            info!("Using mock session service with {} users", cfg.users.len());
            let mut service = MockSessionService::new(cfg, http.token_store().clone());
            if let Some(handler) = http.invalidation_handler() {
                service = service.with_invalidation_handler(handler);
            }
            Arc::new(service)
        }
    }
}

/// Clears the store when dropped, so a logout that fails, panics or is
/// cancelled mid-flight still ends signed out.
pub(crate) struct ClearOnDrop<'a>(pub(crate) &'a TokenStore);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}
