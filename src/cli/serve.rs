use std::sync::Arc;

use reqwest::Client;

use crate::{
    config, error, info,
    management::SessionManager,
    recommendations::RecommendOptions,
    server::{AppState, start_api_server},
    spotify::auth::SpotifyOAuth,
};

/// Runs the web app until the process is stopped.
pub async fn serve(addr: Option<String>, options: RecommendOptions) {
    let client = Client::new();
    let oauth = match SpotifyOAuth::from_config(client.clone()) {
        Ok(oauth) => oauth,
        Err(e) => error!("Cannot start server. {}", e),
    };

    let state = AppState {
        sessions: SessionManager::new(config::session_idle_timeout()),
        oauth: Arc::new(oauth),
        client,
        api_url: config::spotify_apiurl(),
        options,
    };

    let addr = addr.unwrap_or_else(config::server_addr);
    info!("Serving on http://{}", addr);
    info!("Spotify redirects logins to {}", state.oauth.redirect_uri());

    if let Err(e) = start_api_server(state, &addr).await {
        error!("Server stopped. Err: {}", e);
    }
}
