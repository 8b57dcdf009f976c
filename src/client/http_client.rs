//! Request executor shared by every API call.
//!
//! Every call goes through the same pipeline: read the stored token, attach
//! it as a bearer credential, pick the content type, dispatch, then
//! intercept 401 before anything looks at the body. JSON bodies are parsed;
//! anything else is returned as the raw response.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::RequestBuilder;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::response::{is_json_response, ApiResponse};
use crate::environment::EnvironmentConfig;
use crate::error::{Error, Result, UnauthenticatedReason};
use crate::models::token_preview;
use crate::store::TokenStore;
use crate::utils::log_throttle::LogThrottle;
use crate::utils::value::error_message;

pub const JSON_CONTENT_TYPE: &str = "application/json";
const NO_TOKEN_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Transport settings. No timeout unless one is configured.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct HttpSettings {
    pub timeout_ms: Option<u64>,
}

/// Raised once per 401 response, after the stored session has been cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInvalidated {
    pub method: Method,
    pub path: String,
}

/// Boundary hook for reacting to a server-side session rejection, e.g. by
/// navigating to the login view.
pub trait SessionInvalidationHandler: Send + Sync {
    fn on_session_invalidated(&self, event: &SessionInvalidated);
}

/// Body of an outgoing request.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Caller-chosen content type; replaces the JSON default.
    Bytes {
        content_type: String,
        data: Vec<u8>,
    },
    /// Multipart form; the transport sets the boundary header.
    Multipart(Form),
}

impl From<Option<Value>> for RequestBody {
    fn from(body: Option<Value>) -> Self {
        match body {
            Some(value) => RequestBody::Json(value),
            None => RequestBody::Empty,
        }
    }
}

/// Whether to send the stored token with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Attach,
    Omit,
}

pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    invalidation_handler: Option<Arc<dyn SessionInvalidationHandler>>,
    log_throttle: LogThrottle,
}

impl HttpClient {
    /// Build a client against the resolved environment's base address.
    pub fn new(
        environment: &EnvironmentConfig,
        settings: &HttpSettings,
        tokens: TokenStore,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = settings.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

        info!(
            "Created HTTP client for {} environment at {}",
            environment.environment, environment.api_base_url
        );

        Ok(HttpClient {
            client,
            base_url: environment.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            invalidation_handler: None,
            log_throttle: LogThrottle::new(NO_TOKEN_LOG_WINDOW),
        })
    }

    pub fn with_invalidation_handler(
        mut self,
        handler: Arc<dyn SessionInvalidationHandler>,
    ) -> Self {
        self.invalidation_handler = Some(handler);
        self
    }

    pub fn invalidation_handler(&self) -> Option<Arc<dyn SessionInvalidationHandler>> {
        self.invalidation_handler.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        credentials: Credentials,
    ) -> RequestBuilder {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), &url);

        if credentials == Credentials::Attach {
            match self.tokens.token() {
                Some(token) => {
                    debug!(
                        %method,
                        path,
                        token = %token_preview(&token),
                        "Attaching bearer credential"
                    );
                    request = request.bearer_auth(token);
                }
                None => {
                    if let Some(suppressed_count) =
                        self.log_throttle.should_emit("http.request.no_token")
                    {
                        warn!(
                            event_name = "http.request.no_token",
                            %method,
                            path,
                            suppressed_count,
                            "Sending request without a stored token"
                        );
                    }
                }
            }
        }

        match body {
            RequestBody::Empty => request.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
            RequestBody::Json(value) => request
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(value.to_string()),
            RequestBody::Bytes { content_type, data } => {
                request.header(CONTENT_TYPE, content_type).body(data)
            }
            RequestBody::Multipart(form) => request.multipart(form),
        }
    }

    /// Execute a request through the full pipeline.
    pub async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<ApiResponse> {
        debug!(%method, path, "Dispatching API request");
        let response = self
            .build(method.clone(), path, body, Credentials::Attach)
            .send()
            .await
            .map_err(|e| {
                warn!(%method, path, "Transport failure: {}", e);
                Error::Network(e)
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.invalidate_session(method, path));
        }

        if !is_json_response(&response) {
            debug!(%method, path, status = status.as_u16(), "Returning non-JSON response unparsed");
            return Ok(ApiResponse::Raw(response));
        }

        let text = response.text().await?;
        let payload = parse_payload(&text);

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            warn!(%method, path, status = status.as_u16(), "API request failed: {}", message);
            return Err(Error::Api { status, message });
        }

        match payload {
            Some(value) => Ok(ApiResponse::Json(value)),
            None if text.trim().is_empty() => Ok(ApiResponse::Json(Value::Null)),
            None => Err(Error::Decode(format!(
                "{} {} returned a malformed JSON body",
                method, path
            ))),
        }
    }

    /// `send` with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        self.send(method, path, body.into()).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, None).await
    }

    /// GET and deserialize the JSON payload.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    /// POST a multipart form. Same credential and 401 handling as `request`.
    pub async fn upload(&self, path: &str, form: Form) -> Result<ApiResponse> {
        self.send(Method::POST, path, RequestBody::Multipart(form))
            .await
    }

    /// One round trip without the 401 interceptor. Returns the status and the
    /// JSON payload, or `Value::Null` when the body is not JSON.
    ///
    /// Reserved for the credential endpoints, where a 401 means "wrong
    /// password" rather than "session expired".
    pub async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        credentials: Credentials,
    ) -> Result<(StatusCode, Value)> {
        debug!(%method, path, "Dispatching credential exchange");
        let response = self
            .build(method, path, body.into(), credentials)
            .send()
            .await?;
        let status = response.status();
        let is_json = is_json_response(&response);
        let text = response.text().await?;
        let payload = if is_json {
            parse_payload(&text).unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        Ok((status, payload))
    }

    fn invalidate_session(&self, method: Method, path: &str) -> Error {
        warn!(
            event_name = "http.session.invalidated",
            %method,
            path,
            "Server rejected the session; clearing stored credentials"
        );
        self.tokens.clear();
        if let Some(handler) = &self.invalidation_handler {
            handler.on_session_invalidated(&SessionInvalidated {
                method,
                path: path.to_string(),
            });
        }
        Error::Unauthenticated(UnauthenticatedReason::SessionInvalidated)
    }
}

fn parse_payload(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}
