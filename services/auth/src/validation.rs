//! Input validation utilities
//!
//! Checks run before a login or registration request leaves the client, so
//! obvious form mistakes surface as inline messages without a round trip.

use common::{ClientError, ClientResult};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LoginCredentials, RegisterProfile};

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > 64 {
        return Err("Name must be at most 64 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate budget, when given
pub fn validate_budget(budget: Option<f64>) -> Result<(), String> {
    match budget {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err("Budget must be a positive amount".to_string())
        }
        _ => Ok(()),
    }
}

/// Login form check: both fields present, email well formed
pub fn validate_credentials(credentials: &LoginCredentials) -> ClientResult<()> {
    validate_email(credentials.email.trim()).map_err(ClientError::Validation)?;
    if credentials.password.is_empty() {
        return Err(ClientError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// Registration form check
pub fn validate_registration(profile: &RegisterProfile) -> ClientResult<()> {
    validate_name(&profile.name)
        .and_then(|_| validate_email(profile.email.trim()))
        .and_then(|_| validate_password(&profile.password))
        .and_then(|_| validate_budget(profile.budget))
        .map_err(ClientError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ada@").is_err());
        assert!(validate_email("ada example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("abc"),
            Err("Password must be at least 6 characters long".to_string())
        );
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget(None).is_ok());
        assert!(validate_budget(Some(50.0)).is_ok());
        assert!(validate_budget(Some(-1.0)).is_err());
        assert!(validate_budget(Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_validate_registration_reports_first_problem() {
        let profile = RegisterProfile {
            name: " ".into(),
            email: "bad".into(),
            password: "1".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_registration(&profile),
            Err(ClientError::Validation("Name is required".to_string()))
        );
    }

    #[test]
    fn test_validate_credentials() {
        let ok = LoginCredentials {
            email: "ada@example.com".into(),
            password: "pw".into(),
        };
        assert!(validate_credentials(&ok).is_ok());

        let missing = LoginCredentials {
            email: "ada@example.com".into(),
            password: String::new(),
        };
        assert!(matches!(
            validate_credentials(&missing),
            Err(ClientError::Validation(_))
        ));
    }
}
