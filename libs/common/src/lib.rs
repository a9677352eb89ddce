//! Common library for the meal planner client
//!
//! This crate provides functionality shared by the session manager and the
//! dashboard: the error taxonomy, persisted session storage, HTTP plumbing
//! and client configuration.

pub mod config;
pub mod error;
pub mod http;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use http::BearerToken;
pub use storage::{FileStore, MemoryStore, SessionStore};
