//! Session management on top of persisted client storage
//!
//! [`SessionManager`] is the only writer of the `token` and `user` keys.
//! Both keys are always written and removed in the same storage call.
//! Validity is checked lazily: an expired, malformed or half-written
//! session is cleared the next time anybody asks whether it is usable.

use chrono::Utc;
use common::{BearerToken, ClientError, ClientResult, SessionStore};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    client::AuthApi,
    jwt,
    models::{
        AuthResponse, LoginCredentials, PreferencesUpdate, ProfileUpdate, RegisterProfile,
        Session, SessionState, UserProfile,
    },
    validation,
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Supplier of credentials for authenticated requests
pub trait TokenSource: Send + Sync {
    /// The bearer token, only while the session is usable
    fn valid_token(&self) -> Option<BearerToken>;

    /// Drop the session after the backend rejected it
    fn invalidate(&self);
}

/// Session manager for the authenticated user
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    api: Arc<dyn AuthApi>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, api: Arc<dyn AuthApi>) -> Self {
        Self { store, api }
    }

    /// Log in and persist the returned session
    ///
    /// Storage is left untouched when the backend refuses the credentials.
    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<Session> {
        validation::validate_credentials(credentials)?;
        info!("Login attempt for user: {}", credentials.email);

        let response = self.api.login(credentials).await.inspect_err(|e| {
            warn!("Login failed for {}: {}", credentials.email, e);
        })?;
        self.establish(response)
    }

    /// Register a new account and persist the returned session
    pub async fn register(&self, profile: &RegisterProfile) -> ClientResult<Session> {
        validation::validate_registration(profile)?;
        info!("Registering user: {}", profile.email);

        let response = self.api.register(profile).await.inspect_err(|e| {
            warn!("Registration failed for {}: {}", profile.email, e);
        })?;
        self.establish(response)
    }

    /// Log out locally, telling the backend on a best-effort basis
    ///
    /// Storage is cleared whatever the backend says, so the local session
    /// can never get stuck while the server is unreachable.
    pub async fn logout(&self) {
        let token = self.stored_token();
        if let Err(e) = self.api.logout(token.as_ref()).await {
            warn!("Logout notification failed, clearing locally anyway: {}", e);
        }
        self.clear();
        info!("Logged out");
    }

    /// True iff a token and a profile are stored and the token has not expired
    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Bootstrap check run once at startup
    pub fn restore(&self) -> SessionState {
        let state = self.state();
        match state {
            SessionState::Authenticated => info!("Restored cached session"),
            SessionState::Unauthenticated => info!("No usable cached session"),
        }
        state
    }

    /// The token, only while [`SessionManager::is_authenticated`] holds
    pub fn get_valid_token(&self) -> Option<BearerToken> {
        self.current_session().map(|session| session.token)
    }

    /// The cached profile, without an expiry check
    pub fn stored_user(&self) -> Option<UserProfile> {
        let raw = match self.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                error!("Failed to read cached user: {}", e);
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!("Cached user is unreadable: {}", e))
            .ok()
    }

    /// Remove the session from storage
    pub fn clear(&self) {
        if let Err(e) = self.store.remove_all(&[TOKEN_KEY, USER_KEY]) {
            error!("Failed to clear session storage: {}", e);
        }
    }

    /// `PUT /users/profile`, then refresh the cached profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let session = self.require_session()?;
        let returned = self
            .api
            .update_profile(&session.token, update)
            .await
            .inspect_err(|e| self.on_request_error(e))?;

        let user = returned.unwrap_or_else(|| {
            let mut user = session.user.clone();
            user.apply_profile(update);
            user
        });
        self.replace_user(&session.token, &user)?;
        info!("Profile updated for user: {}", user.id);
        Ok(user)
    }

    /// `PUT /users/preferences`, then refresh the cached profile
    ///
    /// Resolves only once the backend has confirmed the change.
    pub async fn update_preferences(
        &self,
        update: &PreferencesUpdate,
    ) -> ClientResult<UserProfile> {
        let session = self.require_session()?;
        let returned = self
            .api
            .update_preferences(&session.token, update)
            .await
            .inspect_err(|e| self.on_request_error(e))?;

        let user = returned.unwrap_or_else(|| {
            let mut user = session.user.clone();
            user.apply_preferences(update);
            user
        });
        self.replace_user(&session.token, &user)?;
        info!("Preferences updated for user: {}", user.id);
        Ok(user)
    }

    fn require_session(&self) -> ClientResult<Session> {
        self.current_session()
            .ok_or_else(|| ClientError::AuthRejected("No valid session".to_string()))
    }

    fn on_request_error(&self, err: &ClientError) {
        if err.is_auth_failure() {
            warn!("Backend rejected the session: {}", err);
            self.clear();
        }
    }

    fn establish(&self, response: AuthResponse) -> ClientResult<Session> {
        let token = BearerToken::new(&response.token);
        let expires_at = jwt::decode_expiry(&token)?;
        if expires_at <= Utc::now() {
            return Err(ClientError::AuthRejected(
                "Backend issued an expired token".to_string(),
            ));
        }

        self.write(&token, &response.user)?;
        info!("Session established for user: {}", response.user.id);

        Ok(Session {
            token,
            user: response.user,
            expires_at,
        })
    }

    /// Refresh the cached profile, only while `token` is still the stored one
    ///
    /// A logout or invalidation that landed while the update was in flight
    /// wins; the session is not written back.
    fn replace_user(&self, token: &BearerToken, user: &UserProfile) -> ClientResult<()> {
        let user_json = serialize_user(user)?;
        let written = self.store.set_all_if(
            TOKEN_KEY,
            token.as_str(),
            &[(USER_KEY, user_json)],
        )?;
        if !written {
            warn!("Session ended during the update, not caching user {}", user.id);
        }
        Ok(())
    }

    fn write(&self, token: &BearerToken, user: &UserProfile) -> ClientResult<()> {
        self.store.set_all(&[
            (TOKEN_KEY, token.as_str().to_string()),
            (USER_KEY, serialize_user(user)?),
        ])?;
        Ok(())
    }

    /// Stored token regardless of expiry, for the logout notification
    fn stored_token(&self) -> Option<BearerToken> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.map(BearerToken::new),
            Err(e) => {
                error!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    fn current_session(&self) -> Option<Session> {
        let mut values = match self.store.get_all(&[TOKEN_KEY, USER_KEY]) {
            Ok(values) => values.into_iter(),
            Err(e) => {
                error!("Failed to read session storage: {}", e);
                return None;
            }
        };

        let (token, user) = match (values.next().flatten(), values.next().flatten()) {
            (None, None) => return None,
            (Some(token), Some(user)) => (BearerToken::new(token), user),
            _ => {
                warn!("Found a token without its user (or the reverse), clearing");
                self.clear();
                return None;
            }
        };

        let user: UserProfile = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!("Cached user is unreadable, clearing session: {}", e);
                self.clear();
                return None;
            }
        };

        match jwt::decode_expiry(&token) {
            Ok(expires_at) if expires_at > Utc::now() => Some(Session {
                token,
                user,
                expires_at,
            }),
            Ok(expires_at) => {
                info!("Session expired at {}, clearing", expires_at);
                self.clear();
                None
            }
            Err(e) => {
                warn!("Stored token is unusable, clearing: {}", e);
                self.clear();
                None
            }
        }
    }
}

fn serialize_user(user: &UserProfile) -> ClientResult<String> {
    serde_json::to_string(user)
        .map_err(|e| ClientError::Storage(format!("Failed to serialize user: {}", e)))
}

impl TokenSource for SessionManager {
    fn valid_token(&self) -> Option<BearerToken> {
        self.get_valid_token()
    }

    fn invalidate(&self) {
        warn!("Session invalidated");
        self.clear();
    }
}
