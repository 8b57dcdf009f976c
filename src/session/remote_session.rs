use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::base::{ClearOnDrop, SessionService, LOGIN_FAILED, NETWORK_FAILURE, REGISTER_FAILED};
use crate::client::endpoints::{AUTH_LOGIN, AUTH_LOGOUT, AUTH_PROFILE, AUTH_REGISTER};
use crate::client::{Credentials, HttpClient};
use crate::error::{Error, Result, UnauthenticatedReason};
use crate::models::{Registration, Role, Session, UserProfile};
use crate::store::TokenStore;
use crate::utils::value::{error_message, string_or_number};

/// Shape of a successful `/auth/login` answer.
#[derive(Deserialize)]
struct LoginPayload {
    access_token: String,
    user: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    username: String,
    #[serde(default)]
    email: Option<String>,
    role: Role,
}

impl LoginPayload {
    fn into_session(self) -> Result<Session> {
        if self.access_token.trim().is_empty() {
            return Err(Error::Decode("empty access_token".to_string()));
        }
        Ok(Session {
            token: self.access_token,
            user_id: self.user.id,
            username: self.user.username,
            email: self.user.email.unwrap_or_default(),
            role: self.user.role,
        })
    }
}

/// Session service backed by the API's token-issuing endpoints.
pub struct RemoteSessionService {
    http: Arc<HttpClient>,
}

impl RemoteSessionService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        RemoteSessionService { http }
    }

    /// POST to a credential endpoint, mapping every failure to `Error::Auth`.
    async fn credential_call(&self, path: &str, body: Value, fallback: &str) -> Result<Value> {
        let (status, payload) = self
            .http
            .exchange(Method::POST, path, Some(body), Credentials::Omit)
            .await
            .map_err(|e| {
                warn!(path, "Credential call failed before a response: {}", e);
                Error::Auth(NETWORK_FAILURE.to_string())
            })?;

        if !status.is_success() {
            let message = error_message(&payload).unwrap_or_else(|| fallback.to_string());
            warn!(path, status = status.as_u16(), "Credential call rejected: {}", message);
            return Err(Error::Auth(message));
        }
        Ok(payload)
    }
}

#[async_trait]
impl SessionService for RemoteSessionService {
    fn get_name(&self) -> &str {
        "remote"
    }

    fn token_store(&self) -> &TokenStore {
        self.http.token_store()
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        debug!("Login attempt for user '{}'", username);
        let payload = self
            .credential_call(
                AUTH_LOGIN,
                json!({ "username": username, "password": password }),
                LOGIN_FAILED,
            )
            .await?;

        let session = serde_json::from_value::<LoginPayload>(payload)
            .map_err(|e| Error::Decode(e.to_string()))
            .and_then(LoginPayload::into_session)
            .map_err(|e| {
                warn!("Login for '{}' returned a malformed identity: {}", username, e);
                Error::Auth(LOGIN_FAILED.to_string())
            })?;

        self.token_store().set(&session)?;
        info!(
            "User '{}' logged in with role '{}'",
            session.username, session.role
        );
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<String> {
        let body = serde_json::to_value(registration).map_err(|e| Error::Decode(e.to_string()))?;
        let payload = self
            .credential_call(AUTH_REGISTER, body, REGISTER_FAILED)
            .await?;
        info!("Registered user '{}'", registration.username);
        Ok(payload["message"]
            .as_str()
            .unwrap_or("registration succeeded")
            .to_string())
    }

    async fn logout(&self) {
        let _clear = ClearOnDrop(self.token_store());
        if self.token_store().token().is_none() {
            debug!("Logout without a stored token; clearing local state only");
            return;
        }
        match self
            .http
            .exchange(Method::POST, AUTH_LOGOUT, None, Credentials::Attach)
            .await
        {
            Ok((status, _)) if status.is_success() => debug!("Server acknowledged logout"),
            Ok((status, payload)) => warn!(
                status = status.as_u16(),
                "Server refused logout: {}",
                error_message(&payload).unwrap_or_default()
            ),
            Err(e) => warn!("Logout notification failed: {}", e),
        }
        info!("Logged out");
    }

    async fn get_profile(&self) -> Result<UserProfile> {
        if !self.is_authenticated() {
            return Err(Error::Unauthenticated(UnauthenticatedReason::NoToken));
        }
        let payload = self.http.get(AUTH_PROFILE).await?.into_json()?;
        // The identity sits under "user" alongside a success flag.
        let user = match payload.get("user") {
            Some(user) => user.clone(),
            None => payload,
        };
        serde_json::from_value(user).map_err(|e| Error::Decode(format!("profile: {}", e)))
    }
}
