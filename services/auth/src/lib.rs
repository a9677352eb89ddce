//! Session manager for the meal planner client
//!
//! Owns the authentication token and the cached user profile, persisted
//! through a [`common::SessionStore`], and answers the one question every
//! other component asks: is there a usable authenticated session?

pub mod client;
pub mod interceptor;
pub mod jwt;
pub mod models;
pub mod session;
pub mod validation;

pub use client::{AuthApi, HttpAuthApi};
pub use models::{
    LoginCredentials, PreferencesUpdate, ProfileUpdate, RegisterProfile, Session, SessionState,
    UserProfile,
};
pub use session::{SessionManager, TokenSource};
