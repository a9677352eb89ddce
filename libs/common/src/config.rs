//! Client configuration
//!
//! Settings are read from `MEALPLAN_*` environment variables on top of
//! built-in defaults pointing at a local backend.

use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientResult;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_RESTAURANT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_FILE: &str = ".mealplan/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Configuration for the backend clients
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Meal-planning API base URL, without trailing slash
    pub api_base_url: String,
    /// Restaurant recommendation service origin
    pub restaurant_base_url: String,
    /// Where the persisted session lives
    pub session_file: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            restaurant_base_url: DEFAULT_RESTAURANT_BASE_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEALPLAN_API_BASE_URL`: API base URL (default: "http://localhost:5000/api")
    /// - `MEALPLAN_RESTAURANT_BASE_URL`: restaurant service origin
    ///   (default: "http://localhost:8000")
    /// - `MEALPLAN_SESSION_FILE`: session storage file (default: ".mealplan/session.json")
    /// - `MEALPLAN_REQUEST_TIMEOUT_SECS`: request timeout (default: 15)
    pub fn from_env() -> ClientResult<Self> {
        Self::load(None)
    }

    /// Same as [`ClientConfig::from_env`], reading variables from `vars` instead
    /// of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> ClientResult<Self> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> ClientResult<Self> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("restaurant_base_url", defaults.restaurant_base_url)?
            .set_default(
                "session_file",
                defaults.session_file.to_string_lossy().into_owned(),
            )?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .add_source(
                Environment::with_prefix("MEALPLAN")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let mut loaded: ClientConfig = config.try_deserialize()?;
        loaded.api_base_url = loaded.api_base_url.trim_end_matches('/').to_string();
        loaded.restaurant_base_url = loaded.restaurant_base_url.trim_end_matches('/').to_string();
        Ok(loaded)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join a path onto the API base URL
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_variables() {
        let config = ClientConfig::from_vars(HashMap::new()).expect("defaults load");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_variables_override_defaults() {
        let vars = HashMap::from([
            (
                "MEALPLAN_API_BASE_URL".to_string(),
                "https://meals.example.com/api/".to_string(),
            ),
            ("MEALPLAN_REQUEST_TIMEOUT_SECS".to_string(), "3".to_string()),
        ]);

        let config = ClientConfig::from_vars(vars).expect("config loads");
        assert_eq!(config.api_base_url, "https://meals.example.com/api");
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.restaurant_base_url, DEFAULT_RESTAURANT_BASE_URL);
    }

    #[test]
    fn test_api_url_joins_paths() {
        let config = ClientConfig::default();
        assert_eq!(
            config.api_url("/auth/login"),
            "http://localhost:5000/api/auth/login"
        );
        assert_eq!(
            config.api_url("meal-plans/today"),
            "http://localhost:5000/api/meal-plans/today"
        );
    }
}
