//! # Session manager
//!
//! Owns the authentication token lifecycle: login persists the access token, the refresh
//! token and the serialized user; refresh overwrites the access token only; logout clears
//! everything. `is_authenticated` is the presence of a stored access token and nothing more
//! (no expiry or signature check happens client-side).

use log::{info, warn};
use std::sync::Arc;
use validator::Validate;

use super::token::{decode_unverified, Claims};
use super::{AuthResponse, LoginRequest, RefreshResponse};
use crate::api::ApiClient;
use crate::error::{AuthError, ClientError};
use crate::models::User;
use crate::storage::{SessionStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

/// Read-only view of whether a session exists. The router guard depends only on this.
pub trait SessionState {
    fn is_authenticated(&self) -> bool;
}

impl SessionState for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn storage(&self) -> &Arc<dyn SessionStorage> {
        self.api.storage()
    }

    /// Authenticates against `/auth/login` and persists the returned session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        let response = self.api.login(&credentials).await?;
        if !response.access_token.is_empty() {
            let user = serde_json::to_string(&response.user)
                .map_err(|e| ClientError::Storage(e.to_string()))?;
            self.storage().set(ACCESS_TOKEN_KEY, &response.access_token)?;
            self.storage().set(REFRESH_TOKEN_KEY, &response.refresh_token)?;
            self.storage().set(USER_KEY, &user)?;
            info!("Logged in as user {} ({})", response.user.id, response.user.email);
        } else {
            warn!("Login response for {} carried no access token; nothing persisted", email);
        }
        Ok(response)
    }

    /// Obtains a new access token with the persisted refresh token.
    ///
    /// Fails with `AuthError::MissingRefreshToken` before any request is made when no
    /// refresh token is stored, or the stored one is empty. Only the access token is
    /// overwritten on success.
    pub async fn refresh_token(&self) -> Result<RefreshResponse, ClientError> {
        let stored = self.storage().get(REFRESH_TOKEN_KEY)?;
        if stored.filter(|token| !token.is_empty()).is_none() {
            return Err(AuthError::MissingRefreshToken.into());
        }

        let response = self.api.refresh().await?;
        if !response.access_token.is_empty() {
            self.storage().set(ACCESS_TOKEN_KEY, &response.access_token)?;
            info!("Access token refreshed");
        }
        Ok(response)
    }

    /// Clears all persisted session data. Storage failures are logged, never returned.
    pub fn logout(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage().remove(key) {
                warn!("Failed to clear {} during logout: {}", key, e);
            }
        }
        info!("Logged out");
    }

    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage().get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read stored user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Stored user record is unreadable: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        match self.storage().get(ACCESS_TOKEN_KEY) {
            Ok(token) => token.is_some_and(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read access token: {}", e);
                false
            }
        }
    }

    /// Claims of the stored access token, for display only.
    pub fn access_claims(&self) -> Option<Claims> {
        let token = self.storage().get(ACCESS_TOKEN_KEY).ok().flatten()?;
        match decode_unverified(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

impl SessionState for SessionManager {
    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }
}
