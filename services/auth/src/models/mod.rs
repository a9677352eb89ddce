//! Session manager models

pub mod session;
pub mod user;

// Re-export for convenience
pub use session::{AuthResponse, Session, SessionState};
pub use user::{LoginCredentials, PreferencesUpdate, ProfileUpdate, RegisterProfile, UserProfile};
