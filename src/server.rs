use axum::{
    Extension, Router,
    routing::{get, post},
};
use reqwest::Client;
use std::{io, net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    api, config,
    management::SessionManager,
    recommendations::RecommendOptions,
    spotify::{auth::SpotifyOAuth, catalog::SpotifyCatalog},
    types::PkceToken,
};

/// Shared state of the web app.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub oauth: Arc<SpotifyOAuth>,
    pub client: Client,
    pub api_url: String,
    pub options: RecommendOptions,
}

impl AppState {
    /// Catalog client acting with the given access token.
    pub fn catalog(&self, token: String) -> SpotifyCatalog {
        SpotifyCatalog::new(self.client.clone(), self.api_url.clone(), token)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/dashboard", get(api::dashboard))
        .route("/recommendations", post(api::recommendations))
        .route("/health", get(api::health))
        .with_state(state)
}

pub async fn start_api_server(state: AppState, addr: &str) -> io::Result<()> {
    let listener = bind(addr).await?;
    axum::serve(listener, app(state)).await
}

/// Router for the one-shot login of the CLI commands.
pub fn callback_router(state: Arc<Mutex<Option<PkceToken>>>, oauth: Arc<SpotifyOAuth>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::cli_callback))
        .layer(Extension(state))
        .layer(Extension(oauth))
}

pub async fn start_callback_server(
    state: Arc<Mutex<Option<PkceToken>>>,
    oauth: Arc<SpotifyOAuth>,
) -> io::Result<()> {
    let listener = bind(&config::server_addr()).await?;
    axum::serve(listener, callback_router(state, oauth)).await
}

async fn bind(addr: &str) -> io::Result<tokio::net::TcpListener> {
    let addr = SocketAddr::from_str(addr).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Failed to parse server address '{addr}': {e}"),
        )
    })?;
    tokio::net::TcpListener::bind(&addr).await
}
