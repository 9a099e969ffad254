use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    config::{self, Credentials},
    error::{AppError, AuthError},
    info,
    server::start_callback_server,
    types::{OAuthErrorResponse, PkceToken, Token, TokenResponse},
    utils, warning,
};

/// Seconds before the real expiry at which a token is already considered stale.
pub const EXPIRY_MARGIN_SECS: u64 = 240;

const DEFAULT_EXPIRES_IN: u64 = 3600;
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Spotify accounts service.
#[derive(Debug, Clone)]
pub struct SpotifyOAuth {
    client: Client,
    credentials: Credentials,
    auth_url: String,
    token_url: String,
}

impl SpotifyOAuth {
    pub fn new(
        client: Client,
        credentials: Credentials,
        auth_url: String,
        token_url: String,
    ) -> Self {
        Self {
            client,
            credentials,
            auth_url,
            token_url,
        }
    }

    /// Builds the client from the environment.
    pub fn from_config(client: Client) -> Result<Self, AppError> {
        Ok(Self::new(
            client,
            config::credentials()?,
            config::spotify_apiauth_url(),
            config::spotify_apitoken_url(),
        ))
    }

    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }

    /// URL the user is sent to in order to grant access.
    ///
    /// `show_dialog` is always set so a logged-out user can switch accounts
    /// instead of being silently re-approved.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("scope", config::SPOTIFY_SCOPE),
                ("state", state),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| AuthError::Authorization(format!("invalid authorize url: {e}")))?;

        Ok(url.to_string())
    }

    /// Exchanges the authorization code from the callback for a token.
    ///
    /// # Errors
    ///
    /// [`AuthError::Authorization`] when the code is invalid, expired or was
    /// issued for another verifier; [`AuthError::Http`] on transport failures.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Token, AuthError> {
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("code_verifier", verifier),
            ],
            None,
        )
        .await
    }

    /// Trades a refresh token for a fresh access token.
    ///
    /// Spotify may omit the refresh token in the response; the old one stays
    /// valid in that case and is carried over.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Some(refresh_token),
        )
        .await
        .map_err(|e| AuthError::Refresh(e.to_string()))
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> Result<Token, AuthError> {
        let res = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let message = match res.json::<OAuthErrorResponse>().await {
                Ok(body) => body.error_description.unwrap_or(body.error),
                Err(_) => format!("accounts service returned {status}"),
            };
            return Err(AuthError::Authorization(message));
        }

        let body = res.json::<TokenResponse>().await?;
        token_from_response(body, previous_refresh, utils::unix_now())
    }
}

/// Turns a token endpoint response into a [`Token`] obtained at `obtained_at`.
pub fn token_from_response(
    body: TokenResponse,
    previous_refresh: Option<&str>,
    obtained_at: u64,
) -> Result<Token, AuthError> {
    let refresh_token = body
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| previous_refresh.map(str::to_string))
        .ok_or_else(|| AuthError::Authorization("token response without refresh token".into()))?;

    Ok(Token {
        access_token: body.access_token,
        refresh_token,
        scope: body.scope,
        expires_in: body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        obtained_at,
    })
}

pub fn is_expired(token: &Token) -> bool {
    is_expired_at(token, utils::unix_now())
}

pub fn is_expired_at(token: &Token, now: u64) -> bool {
    now.saturating_add(EXPIRY_MARGIN_SECS) >= token.expires_at()
}

/// Runs the interactive login for the CLI.
///
/// Starts the callback server, opens the authorize URL in the default browser
/// and waits for the callback handler to exchange the code. The token only
/// lives in memory for the duration of the command.
pub async fn login(oauth: Arc<SpotifyOAuth>) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();
    let auth_url = oauth.authorize_url(&state, &code_challenge)?;

    let shared_state = Arc::new(Mutex::new(Some(PkceToken {
        state,
        code_verifier,
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let server_oauth = Arc::clone(&oauth);
    let server = tokio::spawn(async move {
        if let Err(e) = start_callback_server(server_state, server_oauth).await {
            warning!("Login callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }
    info!("Waiting for Spotify login in your browser...");

    let token = wait_for_token(shared_state).await;
    server.abort();

    token.ok_or_else(|| AuthError::Authorization("login failed or timed out".into()))
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|p| p.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
