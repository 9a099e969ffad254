mod common;

use std::time::Duration;

use reqwest::Client;
use spotrec::{
    config::Credentials,
    error::AuthError,
    management::SessionManager,
    recommendations::{RecommendOptions, SeenState, build_recommendations},
    spotify::auth::SpotifyOAuth,
    types::{Identity, Token},
    utils,
};

use common::{FakeCatalog, ids, solo};

fn identity() -> Identity {
    Identity {
        id: "listener".to_string(),
        display_name: "Listener".to_string(),
    }
}

fn token(expires_in: u64) -> Token {
    Token {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        scope: "user-top-read user-read-private".to_string(),
        expires_in,
        obtained_at: utils::unix_now(),
    }
}

// Nothing listens on the discard port, so every token request fails.
fn unreachable_oauth() -> SpotifyOAuth {
    SpotifyOAuth::new(
        Client::new(),
        Credentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://127.0.0.1:5000/callback".to_string(),
        },
        "http://127.0.0.1:9/authorize".to_string(),
        "http://127.0.0.1:9/api/token".to_string(),
    )
}

fn manager() -> SessionManager {
    SessionManager::new(Duration::from_secs(3600))
}

#[tokio::test]
async fn test_open_creates_and_reuses_sessions() {
    let sessions = manager();

    let sid = sessions.open(None).await;
    assert_eq!(sessions.open(Some(&sid)).await, sid);

    // Unknown ids get a fresh session
    let other = sessions.open(Some("forged-id")).await;
    assert_ne!(other, "forged-id");
    assert_ne!(other, sid);
    assert_eq!(sessions.len().await, 2);
}

#[tokio::test]
async fn test_idle_sessions_expire() {
    let sessions = SessionManager::new(Duration::from_millis(50));
    let sid = sessions.open(None).await;
    let sid = sessions.complete_login(&sid, identity(), token(3600)).await;

    tokio::time::sleep(Duration::from_millis(120)).await;

    let reopened = sessions.open(Some(&sid)).await;
    assert_ne!(reopened, sid);
    assert_eq!(sessions.current_identity(&reopened).await, None);
    assert_eq!(sessions.len().await, 1);
}

#[tokio::test]
async fn test_login_flow_attaches_identity() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    assert_eq!(sessions.current_identity(&sid).await, None);

    let pending = sessions.begin_login(&sid).await;
    let taken = sessions.take_pending_login(&sid, &pending.state).await.unwrap();
    assert_eq!(taken, pending);

    let logged_in = sessions.complete_login(&sid, identity(), token(3600)).await;
    assert_eq!(sessions.current_identity(&logged_in).await, Some(identity()));
}

#[tokio::test]
async fn test_login_rotates_session_id() {
    let sessions = manager();
    let planted = sessions.open(None).await;

    let logged_in = sessions.complete_login(&planted, identity(), token(3600)).await;

    assert_ne!(logged_in, planted);
    assert_eq!(sessions.current_identity(&planted).await, None);
    assert_eq!(sessions.len().await, 1);

    // The pre-login id no longer names a session
    let reopened = sessions.open(Some(&planted)).await;
    assert_ne!(reopened, planted);
    assert_ne!(reopened, logged_in);
}

#[tokio::test]
async fn test_state_mismatch_consumes_pending_login() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    let pending = sessions.begin_login(&sid).await;

    let err = sessions.take_pending_login(&sid, "attacker-state").await.unwrap_err();
    assert!(matches!(err, AuthError::StateMismatch));

    // The genuine state cannot be replayed afterwards
    let err = sessions.take_pending_login(&sid, &pending.state).await.unwrap_err();
    assert!(matches!(err, AuthError::StateMismatch));
}

#[tokio::test]
async fn test_pending_login_is_bound_to_its_session() {
    let sessions = manager();
    let first = sessions.open(None).await;
    let second = sessions.open(None).await;
    let pending = sessions.begin_login(&first).await;

    let err = sessions.take_pending_login(&second, &pending.state).await.unwrap_err();
    assert!(matches!(err, AuthError::StateMismatch));
}

#[tokio::test]
async fn test_ensure_fresh_token_requires_login() {
    let sessions = manager();
    let sid = sessions.open(None).await;

    let err = sessions
        .ensure_fresh_token(&sid, &unreachable_oauth())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotLoggedIn));
}

#[tokio::test]
async fn test_ensure_fresh_token_returns_valid_token() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    let sid = sessions.complete_login(&sid, identity(), token(3600)).await;

    let access = sessions
        .ensure_fresh_token(&sid, &unreachable_oauth())
        .await
        .unwrap();
    assert_eq!(access, "access-1");
}

#[tokio::test]
async fn test_failed_refresh_clears_credential() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    // Inside the expiry margin, so a refresh is attempted
    let sid = sessions.complete_login(&sid, identity(), token(60)).await;

    let err = sessions
        .ensure_fresh_token(&sid, &unreachable_oauth())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Refresh(_)));
    assert_eq!(sessions.current_identity(&sid).await, None);

    // The session itself survives
    assert_eq!(sessions.open(Some(&sid)).await, sid);
}

#[tokio::test]
async fn test_recommendations_and_memory_are_per_session() {
    let sessions = manager();
    let first = sessions.open(None).await;
    let second = sessions.open(None).await;

    let picked = vec![solo("a"), solo("b")];
    let mut seen = sessions.seen_snapshot(&first).await;
    for track in &picked {
        seen.record(track);
    }
    let stored = sessions
        .store_recommendations(&first, picked.clone(), seen)
        .await;
    assert_eq!(stored, picked);

    assert_eq!(sessions.recommendations(&first).await, picked);
    assert_eq!(sessions.seen_snapshot(&first).await.track_count(), 2);

    assert!(sessions.recommendations(&second).await.is_empty());
    assert_eq!(sessions.seen_snapshot(&second).await, SeenState::new());
}

#[tokio::test]
async fn test_stored_memory_only_grows() {
    let sessions = manager();
    let sid = sessions.open(None).await;

    let mut seen = SeenState::new();
    seen.record(&solo("a"));
    sessions.store_recommendations(&sid, vec![solo("a")], seen).await;

    // A stale snapshot must not erase earlier entries
    let mut stale = SeenState::new();
    stale.record(&solo("b"));
    sessions.store_recommendations(&sid, vec![solo("b")], stale).await;

    let merged = sessions.seen_snapshot(&sid).await;
    assert!(merged.has_track("a"));
    assert!(merged.has_track("b"));
}

#[tokio::test]
async fn test_logout_drops_everything() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    let sid = sessions.complete_login(&sid, identity(), token(3600)).await;

    assert!(sessions.logout(&sid).await);
    assert!(!sessions.logout(&sid).await);
    assert!(sessions.is_empty().await);
    assert_eq!(sessions.current_identity(&sid).await, None);
}

#[tokio::test]
async fn test_overlapping_builds_never_repeat_tracks() {
    let sessions = manager();
    let sid = sessions.open(None).await;
    let catalog = FakeCatalog::new().with_genre("indie", vec![solo("a"), solo("b")]);
    let genres = vec!["indie".to_string()];
    let options = RecommendOptions::default();

    // Both requests start from the same memory
    let mut first_seen = sessions.seen_snapshot(&sid).await;
    let mut second_seen = sessions.seen_snapshot(&sid).await;
    let (first, second) = tokio::join!(
        build_recommendations(&catalog, &genres, &mut first_seen, &options),
        build_recommendations(&catalog, &genres, &mut second_seen, &options),
    );
    assert_eq!(ids(&first), ids(&second));

    let first = sessions.store_recommendations(&sid, first, first_seen).await;
    let second = sessions.store_recommendations(&sid, second, second_seen).await;

    assert_eq!(ids(&first), vec!["a", "b"]);
    assert!(second.is_empty());
    assert!(sessions.recommendations(&sid).await.is_empty());
    assert_eq!(sessions.seen_snapshot(&sid).await.track_count(), 2);
}

#[tokio::test]
async fn test_store_for_unknown_session_is_dropped() {
    let sessions = manager();

    let stored = sessions
        .store_recommendations("gone", vec![solo("a")], SeenState::new())
        .await;

    assert!(stored.is_empty());
    assert!(sessions.is_empty().await);
}
