//! Shared client state.
//!
//! Everything a front end needs after startup: the resolved environment,
//! the persistent session, the HTTP client and the router.

use std::sync::Arc;

use crate::client::{DataApi, HttpClient};
use crate::config::ConfigV1;
use crate::environment::EnvironmentConfig;
use crate::navigation::Router;
use crate::session::SessionService;
use crate::store::TokenStore;

/// Application state shared by every caller of the client.
#[derive(Clone)]
pub struct ClientState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Resolved once; never changes for the lifetime of the process.
    pub environment: EnvironmentConfig,
    pub tokens: TokenStore,
    pub http: Arc<HttpClient>,
    pub session: Arc<dyn SessionService>,
    pub data: DataApi,
    pub router: Arc<Router>,
}
