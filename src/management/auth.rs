use crate::{
    error::AuthError,
    spotify::auth::{self, SpotifyOAuth},
    types::Token,
};

/// Holds one user's token in memory and refreshes it when it goes stale.
#[derive(Debug, Clone)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// Returns an access token that is valid for at least the expiry margin,
    /// refreshing it first if needed.
    ///
    /// # Errors
    ///
    /// [`AuthError::Refresh`] when the refresh token was rejected; the held
    /// token is left unchanged.
    pub async fn get_valid_token(&mut self, oauth: &SpotifyOAuth) -> Result<String, AuthError> {
        if self.is_expired() {
            self.token = oauth.refresh_token(&self.token.refresh_token).await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        auth::is_expired(&self.token)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
