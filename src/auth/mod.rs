pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use session::{SessionManager, SessionState};
pub use token::{decode_unverified, Claims};

/// Represents the payload for a user login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// User's password. Strength rules are the server's business; it only has to be present.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Short-lived token sent as bearer on every protected request.
    pub access_token: String,
    /// Long-lived token used only to obtain a new access token.
    pub refresh_token: String,
    /// The authenticated user.
    pub user: User,
}

/// Response body of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}
