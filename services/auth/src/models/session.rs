//! Session model and related functionality

use chrono::{DateTime, Utc};
use common::BearerToken;
use serde::Deserialize;

use super::user::UserProfile;

/// Authenticated session: credential plus cached profile
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: BearerToken,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}

/// Whether a usable session exists
///
/// There is no refreshing state: an expired token forces a new login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Login and registration response body
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}
