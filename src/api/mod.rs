//! # API Module
//!
//! HTTP handlers of the spotrec web app and of the CLI login callback.
//!
//! ## Endpoints
//!
//! - [`index`] - login page, or a redirect to the dashboard when logged in
//! - [`login`] - starts the OAuth authorization-code flow
//! - [`callback`] - finishes the flow and attaches the token to the session
//! - [`logout`] - tears the session down
//! - [`dashboard`] - top tracks, artists, genres, albums and the last
//!   recommendations
//! - [`recommendations`] - builds a new recommendation list (form POST)
//! - [`health`] - status and version for monitoring
//! - [`cli_callback`] - callback used by the CLI's one-shot login server
//!
//! Every browser is bound to a session through the `spotrec_session` cookie.
//! Handlers open (or create) the session first and always answer with the
//! cookie set, so a session that expired in the meantime is replaced
//! transparently.

use axum::{
    http::{
        HeaderMap,
        header::{COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};

use crate::utils::{self, SESSION_COOKIE};

mod callback;
mod health;
mod pages;
pub mod render;

pub use callback::callback;
pub use callback::cli_callback;
pub use health::health;
pub use pages::dashboard;
pub use pages::index;
pub use pages::login;
pub use pages::logout;
pub use pages::recommendations;

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| utils::cookie_value(h, SESSION_COOKIE))
}

fn with_session(session_id: &str, response: impl IntoResponse) -> Response {
    ([(SET_COOKIE, utils::session_cookie(session_id))], response).into_response()
}
