use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    api::{render, session_id, with_session},
    error::{AppError, AuthError},
    server::AppState,
    spotify::auth::SpotifyOAuth,
    success,
    types::{Identity, PkceToken},
    warning,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let sid = state.sessions.open(session_id(&headers).as_deref()).await;

    match complete_login(&state, &sid, params).await {
        Ok((sid, identity)) => {
            success!("{} logged in", identity.display_name);
            with_session(&sid, Redirect::to("/dashboard"))
        }
        Err(e) => {
            warning!("Login failed: {}", e);
            with_session(
                &sid,
                (
                    StatusCode::BAD_REQUEST,
                    Html(render::auth_failed_page(&e.to_string())),
                ),
            )
        }
    }
}

/// Finishes the login and returns the session's new id with the identity.
async fn complete_login(
    state: &AppState,
    sid: &str,
    params: CallbackParams,
) -> Result<(String, Identity), AppError> {
    if let Some(error) = params.error {
        return Err(AuthError::Authorization(error).into());
    }
    let code = params
        .code
        .ok_or_else(|| AuthError::Authorization("missing authorization code".into()))?;

    let pending = state
        .sessions
        .take_pending_login(sid, params.state.as_deref().unwrap_or_default())
        .await?;
    let token = state.oauth.exchange_code(&code, &pending.code_verifier).await?;
    let identity = state
        .catalog(token.access_token.clone())
        .current_user()
        .await?;

    let sid = state
        .sessions
        .complete_login(sid, identity.clone(), token)
        .await;
    Ok((sid, identity))
}

pub async fn cli_callback(
    Query(params): Query<CallbackParams>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
    Extension(oauth): Extension<Arc<SpotifyOAuth>>,
) -> impl IntoResponse {
    let Some(code) = params.code else {
        let reason = params.error.unwrap_or_else(|| "missing code".to_string());
        warning!("Login was not granted: {}", reason);
        return Html("<h4>Login failed.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(pkce_state) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if params.state.as_deref() != Some(pkce_state.state.as_str()) {
        warning!("Login callback state did not match");
        return Html("<h4>Login failed.</h4>");
    }

    match oauth.exchange_code(&code, &pkce_state.code_verifier).await {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
