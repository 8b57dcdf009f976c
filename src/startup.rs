//! Client startup.
//!
//! Wires the environment, token store, HTTP client, session service and
//! router together from a loaded configuration.

use std::sync::Arc;
use tracing::info;

use crate::client::{DataApi, HttpClient};
use crate::config::ConfigV1;
use crate::environment::resolve_with;
use crate::error::Result;
use crate::navigation::{LoginRedirect, NavigationGuard, Navigator, RouteTable, Router};
use crate::session::create_session_service;
use crate::state::ClientState;
use crate::store::{create_store, TokenStore};

/// Builds the client state.
///
/// A rejected session anywhere in the HTTP layer sends `navigator` to the
/// configured login route.
///
/// # Errors
///
/// Returns an error if the token store cannot be opened or the HTTP client
/// cannot be built.
pub fn build_state(config: Arc<ConfigV1>, navigator: Arc<dyn Navigator>) -> Result<ClientState> {
    let environment = resolve_with(
        config.environment.hostname.as_deref(),
        &config.environment,
    );
    info!(
        "Resolved {} environment, API at {}",
        environment.environment, environment.api_base_url
    );

    let backend = create_store(&config.store)?;
    let tokens = TokenStore::new(backend);

    let redirect = Arc::new(LoginRedirect::new(
        navigator.clone(),
        config.routes.login.clone(),
    ));
    let http = Arc::new(
        HttpClient::new(&environment, &config.http, tokens.clone())?
            .with_invalidation_handler(redirect),
    );

    let session = create_session_service(&config.session, http.clone());
    let guard = NavigationGuard::new(session.clone(), config.routes.clone());
    let router = Arc::new(Router::new(RouteTable::standard(), guard, navigator));

    Ok(ClientState {
        config,
        environment,
        tokens,
        data: DataApi::new(http.clone()),
        http,
        session,
        router,
    })
}
