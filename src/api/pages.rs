use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{render, session_id, with_session},
    error::{AppError, AuthError},
    info,
    recommendations::{SelectionMode, build_recommendations, seed_genres},
    server::AppState,
    spotify::catalog::SpotifyCatalog,
    stats::{self, TOP_ITEMS_LIMIT},
    utils, warning,
};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendForm {
    pub regenerate: Option<String>,
    pub mode: Option<String>,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = state.sessions.open(session_id(&headers).as_deref()).await;

    if state.sessions.current_identity(&sid).await.is_some() {
        return with_session(&sid, Redirect::to("/dashboard"));
    }
    with_session(&sid, Html(render::login_page()))
}

pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = state.sessions.open(session_id(&headers).as_deref()).await;
    let pending = state.sessions.begin_login(&sid).await;
    let challenge = utils::generate_code_challenge(&pending.code_verifier);

    match state.oauth.authorize_url(&pending.state, &challenge) {
        Ok(url) => with_session(&sid, Redirect::to(&url)),
        Err(e) => {
            warning!("Cannot start login: {}", e);
            with_session(
                &sid,
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::error_page("Login is not available right now.")),
                ),
            )
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(sid) = session_id(&headers) {
        state.sessions.logout(&sid).await;
    }
    (
        [(SET_COOKIE, utils::expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = state.sessions.open(session_id(&headers).as_deref()).await;
    let catalog = match authorized_catalog(&state, &sid).await {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };
    let identity = state.sessions.current_identity(&sid).await;

    match stats::load_dashboard(&catalog, TOP_ITEMS_LIMIT).await {
        Ok(dashboard) => {
            let recommendations = state.sessions.recommendations(&sid).await;
            with_session(
                &sid,
                Html(render::dashboard_page(
                    identity.as_ref(),
                    &dashboard,
                    &recommendations,
                )),
            )
        }
        Err(AppError::NoData) => with_session(&sid, Html(render::no_data_page(identity.as_ref()))),
        Err(e) => {
            warning!("Dashboard failed, asking for a new login: {}", e);
            state.sessions.clear_credential(&sid).await;
            with_session(&sid, Redirect::to("/"))
        }
    }
}

pub async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RecommendForm>,
) -> Response {
    let sid = state.sessions.open(session_id(&headers).as_deref()).await;
    let catalog = match authorized_catalog(&state, &sid).await {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };

    let genres = match seed_genres(&catalog, TOP_ITEMS_LIMIT).await {
        Ok(genres) => genres,
        Err(e) => {
            warning!("Recommendations failed, asking for a new login: {}", e);
            state.sessions.clear_credential(&sid).await;
            return with_session(&sid, Redirect::to("/"));
        }
    };

    let mut options = if form.regenerate.is_some() {
        state.options.regenerate()
    } else {
        state.options.clone()
    };
    if let Some(mode) = form.mode.as_deref() {
        match mode.parse::<SelectionMode>() {
            Ok(mode) => options.mode = mode,
            Err(e) => warning!("{}", e),
        }
    }

    if genres.is_empty() {
        info!("No genre tags to seed recommendations with");
    }

    let mut seen = state.sessions.seen_snapshot(&sid).await;
    let recommendations = build_recommendations(&catalog, &genres, &mut seen, &options).await;
    let stored = state
        .sessions
        .store_recommendations(&sid, recommendations, seen)
        .await;
    info!("{} new recommendations", stored.len());

    with_session(&sid, Redirect::to("/dashboard"))
}

/// Catalog client for the session's user, or the redirect to the login page.
async fn authorized_catalog(state: &AppState, sid: &str) -> Result<SpotifyCatalog, Response> {
    match state.sessions.ensure_fresh_token(sid, &state.oauth).await {
        Ok(token) => Ok(state.catalog(token)),
        Err(e) => {
            if !matches!(e, AuthError::NotLoggedIn) {
                warning!("Session credential dropped: {}", e);
            }
            Err(with_session(sid, Redirect::to("/")))
        }
    }
}
