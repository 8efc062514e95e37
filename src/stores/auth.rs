use log::warn;

use super::StoreStatus;
use crate::auth::{AuthResponse, RefreshResponse, SessionManager, SessionState};
use crate::error::ClientError;
use crate::models::User;

/// Observable authentication state, seeded from whatever session is already persisted.
#[derive(Debug)]
pub struct AuthStore {
    session: SessionManager,
    user: Option<User>,
    is_authenticated: bool,
    status: StoreStatus,
}

impl AuthStore {
    pub fn new(session: SessionManager) -> Self {
        let user = session.current_user();
        let is_authenticated = session.is_authenticated();
        Self {
            session,
            user,
            is_authenticated,
            status: StoreStatus::Idle,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn status(&self) -> &StoreStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let session = &self.session;
        let response = self
            .status
            .track("Login failed", session.login(email, password))
            .await?;
        self.user = Some(response.user.clone());
        self.is_authenticated = true;
        Ok(response)
    }

    /// Refreshes the access token. A rejected or impossible refresh ends the session.
    pub async fn refresh_token(&mut self) -> Result<RefreshResponse, ClientError> {
        match self.session.refresh_token().await {
            Ok(response) => Ok(response),
            Err(err @ ClientError::Auth(_)) => {
                warn!("Token refresh failed, forcing logout: {}", err);
                self.logout();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Drops in-memory state and re-reads it from the persisted session, which is left alone.
    pub fn reset(&mut self) {
        self.user = self.session.current_user();
        self.is_authenticated = self.session.is_authenticated();
        self.status = StoreStatus::Idle;
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.user = None;
        self.is_authenticated = false;
        self.status = StoreStatus::Idle;
    }
}

impl SessionState for AuthStore {
    fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }
}
