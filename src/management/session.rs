use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{
    error::AuthError,
    management::TokenManager,
    recommendations::SeenState,
    spotify::auth::SpotifyOAuth,
    types::{Identity, Token, Track},
    utils,
};

/// Login handshake started by `/login` and finished by `/callback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub state: String,
    pub code_verifier: String,
}

struct Session {
    identity: Option<Identity>,
    token: Option<TokenManager>,
    pending_login: Option<PendingLogin>,
    seen: SeenState,
    recommendations: Vec<Track>,
    last_seen: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            identity: None,
            token: None,
            pending_login: None,
            seen: SeenState::new(),
            recommendations: Vec::new(),
            last_seen: now,
        }
    }
}

/// Owns every browser session of the web app.
///
/// A session is created on first contact, refreshed on every request and
/// torn down on logout or after `idle_timeout` without contact. Sessions
/// never share state with each other.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Returns the id of the live session named by `id`, or of a new session
    /// when there is none. Expired sessions are swept first.
    pub async fn open(&self, id: Option<&str>) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| now.duration_since(s.last_seen) < self.idle_timeout);

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(id) {
                session.last_seen = now;
                return id.to_string();
            }
        }

        let id = utils::generate_session_id();
        sessions.insert(id.clone(), Session::new(now));
        id
    }

    /// The logged-in account of the session, if any.
    pub async fn current_identity(&self, id: &str) -> Option<Identity> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(id)
            .filter(|s| s.token.is_some())
            .and_then(|s| s.identity.clone())
    }

    /// Starts a login: a fresh PKCE verifier and `state` are stored in the
    /// session, replacing any earlier unfinished attempt.
    pub async fn begin_login(&self, id: &str) -> PendingLogin {
        let pending = PendingLogin {
            state: utils::generate_state(),
            code_verifier: utils::generate_code_verifier(),
        };

        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(id) {
            session.pending_login = Some(pending.clone());
        }
        pending
    }

    /// Consumes the pending login if `state` matches it.
    ///
    /// The pending login is removed either way; a mismatching callback cannot
    /// be retried.
    pub async fn take_pending_login(
        &self,
        id: &str,
        state: &str,
    ) -> Result<PendingLogin, AuthError> {
        let mut sessions = self.sessions.lock().await;
        let pending = sessions
            .get_mut(id)
            .and_then(|s| s.pending_login.take())
            .ok_or(AuthError::StateMismatch)?;

        if pending.state != state {
            return Err(AuthError::StateMismatch);
        }
        Ok(pending)
    }

    /// Attaches the identity and credential obtained from the callback and
    /// moves the session to a fresh id, which is returned.
    ///
    /// The id the browser presented before login stops working, so a session
    /// cookie planted by someone else never becomes authenticated.
    pub async fn complete_login(&self, id: &str, identity: Identity, token: Token) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let mut session = sessions.remove(id).unwrap_or_else(|| Session::new(now));

        session.identity = Some(identity);
        session.token = Some(TokenManager::new(token));
        session.pending_login = None;
        session.last_seen = now;

        let new_id = utils::generate_session_id();
        sessions.insert(new_id.clone(), session);
        new_id
    }

    /// Returns a valid access token for the session, refreshing it when it is
    /// about to expire.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotLoggedIn`] when the session has no credential
    /// - [`AuthError::Refresh`] when refreshing failed; the credential is
    ///   cleared so the user has to log in again
    pub async fn ensure_fresh_token(
        &self,
        id: &str,
        oauth: &SpotifyOAuth,
    ) -> Result<String, AuthError> {
        let mut manager = {
            let sessions = self.sessions.lock().await;
            sessions
                .get(id)
                .and_then(|s| s.token.clone())
                .ok_or(AuthError::NotLoggedIn)?
        };

        if !manager.is_expired() {
            return Ok(manager.current_token().access_token.clone());
        }

        match manager.get_valid_token(oauth).await {
            Ok(access_token) => {
                let mut sessions = self.sessions.lock().await;
                if let Some(session) = sessions.get_mut(id) {
                    session.token = Some(manager);
                }
                Ok(access_token)
            }
            Err(e) => {
                self.clear_credential(id).await;
                Err(e)
            }
        }
    }

    /// Drops the session's identity and token but keeps the session itself.
    pub async fn clear_credential(&self, id: &str) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(id) {
            session.identity = None;
            session.token = None;
        }
    }

    /// Copy of the session's recommendation memory.
    pub async fn seen_snapshot(&self, id: &str) -> SeenState {
        let sessions = self.sessions.lock().await;
        sessions.get(id).map(|s| s.seen.clone()).unwrap_or_default()
    }

    /// Stores the latest recommendation list and merges the updated memory
    /// back into the session. Returns the list as stored.
    ///
    /// Tracks another request of the same session recorded after `seen` was
    /// snapshotted are dropped first, so overlapping builds never hand out the
    /// same track twice.
    pub async fn store_recommendations(
        &self,
        id: &str,
        recommendations: Vec<Track>,
        seen: SeenState,
    ) -> Vec<Track> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(id) else {
            return Vec::new();
        };

        let fresh: Vec<Track> = recommendations
            .into_iter()
            .filter(|t| !session.seen.has_track(&t.id))
            .collect();
        session.seen.merge(seen);
        session.recommendations = fresh.clone();
        fresh
    }

    /// The last recommendation list generated in the session.
    pub async fn recommendations(&self, id: &str) -> Vec<Track> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(id)
            .map(|s| s.recommendations.clone())
            .unwrap_or_default()
    }

    /// Tears the session down. Returns false if it did not exist.
    pub async fn logout(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
