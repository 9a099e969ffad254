//! Error types.
//!
//! Every error is recovered at the narrowest scope that can handle it:
//! a failed genre search drops that genre, an auth failure clears the
//! session credential and sends the user back to the login page, and a
//! brand-new account without listening history gets an "insufficient data"
//! view. Nothing here is fatal to the server process.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the Spotify accounts service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the code or redirected back with an error.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The callback `state` did not match the one issued at login.
    #[error("login state mismatch")]
    StateMismatch,

    /// No credential is attached to the session.
    #[error("not logged in")]
    NotLoggedIn,

    /// The refresh token was rejected or the refresh call failed.
    #[error("token refresh failed: {0}")]
    Refresh(String),

    #[error("accounts request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures of a single Web API query (top items, search, profile).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(StatusCode),

    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("unexpected catalog response: {0}")]
    Malformed(String),
}

/// Top-level error taxonomy surfaced to the web and CLI layers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    CatalogQuery(#[from] CatalogError),

    /// The account has no top tracks or artists yet.
    #[error("not enough listening history to show stats")]
    NoData,

    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// True when the access token was rejected and the user must log in again.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CatalogError::Status(status) => *status == StatusCode::UNAUTHORIZED,
            CatalogError::Http(e) => e.status() == Some(StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }
}
