//! Configuration management for spotrec.
//!
//! Configuration comes from environment variables, optionally seeded from a
//! `.env` file in the local data directory. The three Spotify application
//! secrets are required; endpoint URLs, the bind address and the session
//! timeout fall back to sensible defaults.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::error::AppError;

/// Permissions requested from the user. Reading top items needs
/// `user-top-read`; the profile lookup after login needs `user-read-private`.
pub const SPOTIFY_SCOPE: &str = "user-top-read user-read-private";

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 3600;

/// Spotify application credentials registered in the developer dashboard.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at `<data_local_dir>/spotrec/.env`:
/// - Linux: `~/.local/share/spotrec/.env`
/// - macOS: `~/Library/Application Support/spotrec/.env`
/// - Windows: `%LOCALAPPDATA%/spotrec/.env`
///
/// A missing file is not an error; the process environment alone may carry
/// the configuration (e.g. in a container).
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Location of the optional `.env` file.
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotrec/.env");
    path
}

/// Reads the three required Spotify application secrets.
///
/// # Errors
///
/// Returns [`AppError::Config`] naming the first variable that is missing or
/// empty.
pub fn credentials() -> Result<Credentials, AppError> {
    Ok(Credentials {
        client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
        client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
        redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
    })
}

/// Address the web app and the CLI login callback server bind to.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify OAuth authorization endpoint.
pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Spotify OAuth token endpoint used for code exchange and refresh.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Base URL of the Spotify Web API.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// How long a web session may stay idle before it is torn down.
///
/// Unparsable values fall back to the default of one hour.
pub fn session_idle_timeout() -> Duration {
    let secs = env::var("SESSION_IDLE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn required(name: &str) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{name} must be set"))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
