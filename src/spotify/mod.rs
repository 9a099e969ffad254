//! # Spotify Integration Module
//!
//! Clients for the two external collaborators the app depends on:
//!
//! ```text
//! Web / CLI layer
//!          ↓
//! Spotify Integration Layer
//!     ├── auth     Accounts service (authorize URL, code exchange, refresh)
//!     └── catalog  Web API (top items, search, profile) behind `Catalog`
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the OAuth 2.0 authorization-code flow. The application
//! is a confidential client, so the client secret is sent with HTTP Basic auth
//! on every token request; a PKCE challenge and a random `state` are layered on
//! top to bind the callback to the login that started it. Access tokens are
//! treated as expired four minutes before their real expiry.
//!
//! ## Catalog
//!
//! [`catalog`] wraps the read-only Web API calls. Responses are validated into
//! the typed [`Track`](crate::types::Track) and [`Artist`](crate::types::Artist)
//! records at the boundary, dropping malformed entries instead of failing.
//!
//! ## Rate Limiting and Retries
//!
//! - 502 Bad Gateway is retried after a 10 second pause
//! - 429 Too Many Requests honors `Retry-After` up to 120 seconds
//! - Anything else non-2xx becomes a [`CatalogError`]
//! - A 2xx body that does not decode is [`CatalogError::Malformed`]

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{error::CatalogError, warning};

pub mod auth;
pub mod catalog;

const MAX_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Issues an authenticated GET against the Web API and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    token: &str,
    query: &[(&str, String)],
) -> Result<T, CatalogError> {
    let mut attempt = 0;

    loop {
        attempt += 1;
        let response = client.get(url).bearer_auth(token).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_GATEWAY && attempt < MAX_ATTEMPTS {
            sleep(BAD_GATEWAY_DELAY).await;
            continue;
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_secs(&response);
            if retry_after <= MAX_RETRY_AFTER_SECS && attempt < MAX_ATTEMPTS {
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }
            warning!(
                "Spotify asked to retry after {} seconds. Giving up on {}",
                retry_after,
                url
            );
            return Err(CatalogError::RateLimited(retry_after));
        }

        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = response.bytes().await?;
        return serde_json::from_slice::<T>(&body)
            .map_err(|e| CatalogError::Malformed(format!("{url}: {e}")));
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}
