//! HTTP server for headtrack.
//!
//! Exposes the inventory over a small axum application: JSON endpoints for
//! the machine operations, form endpoints for login/reset/export, and two
//! thin server-rendered pages. Session state is a signed cookie; there is
//! no server-side session store.

mod pages;
mod routes;

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::Store;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The record store.
    pub store: Arc<Store>,
    /// The shared credential store.
    pub credentials: Arc<CredentialStore>,
    /// Cookie-signing key.
    key: Key,
}

impl AppState {
    /// Build the application state from its components.
    #[must_use]
    pub fn new(store: Arc<Store>, credentials: Arc<CredentialStore>, key: Key) -> Self {
        Self {
            store,
            credentials,
            key,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/logout", get(routes::logout))
        .route("/reset_password", post(routes::reset_password))
        .route("/get_machine", get(routes::get_machine))
        .route("/move_machine", post(routes::move_machine))
        .route("/add_machine", post(routes::add_machine))
        .route("/remove_machine", post(routes::remove_machine))
        .route("/edit_machine", post(routes::edit_machine))
        .route("/export", post(routes::export))
        .route("/export_filtered", post(routes::export_filtered))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the stores and run the server until shutdown.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened, the listen address
/// cannot be bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    let store = Arc::new(Store::open(config.database_path())?);
    store.log_summary();

    let credentials = Arc::new(CredentialStore::open(
        config.credentials_path(),
        &config.auth.default_password,
    )?);

    let state = AppState::new(store, credentials, config.cookie_key());
    let addr = config.listen_addr()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(Error::Io)?;
    Ok(())
}
