use std::sync::Arc;

use reqwest::Client;

use crate::{
    Res, config,
    spotify::{
        self,
        auth::SpotifyOAuth,
        catalog::SpotifyCatalog,
    },
    success,
};

/// Logs in through the browser and returns a catalog client for the user.
pub(crate) async fn login_catalog() -> Res<SpotifyCatalog> {
    let client = Client::new();
    let oauth = Arc::new(SpotifyOAuth::from_config(client.clone())?);
    let token = spotify::auth::login(oauth).await?;

    let catalog = SpotifyCatalog::new(client, config::spotify_apiurl(), token.access_token);
    let identity = catalog.current_user().await?;
    success!("Logged in as {}", identity.display_name);

    Ok(catalog)
}
