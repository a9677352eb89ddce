//! User model and related functionality

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cached user profile
///
/// Fields the client does not model are kept in `extra` so the profile
/// written to storage reads back exactly as the backend sent it. The id is
/// read from `id` or `_id`; when both are sent, `id` wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", try_from = "RawUserProfile")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of [`UserProfile`], accepting both id spellings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserProfile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    budget: Option<f64>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    dietary_preferences: Vec<String>,
    #[serde(default)]
    cuisine_preferences: Vec<String>,
    #[serde(default)]
    allergies: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawUserProfile> for UserProfile {
    type Error = String;

    fn try_from(raw: RawUserProfile) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.object_id)
            .ok_or_else(|| "missing field `id`".to_string())?;
        Ok(UserProfile {
            id,
            name: raw.name,
            email: raw.email,
            budget: raw.budget,
            location: raw.location,
            dietary_preferences: raw.dietary_preferences,
            cuisine_preferences: raw.cuisine_preferences,
            allergies: raw.allergies,
            extra: raw.extra,
        })
    }
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration payload collected by the onboarding flow
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProfile {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Profile update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Preference update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl UserProfile {
    /// Apply a profile update locally
    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if update.budget.is_some() {
            self.budget = update.budget;
        }
        if update.location.is_some() {
            self.location = update.location.clone();
        }
    }

    /// Apply a preference update locally
    pub fn apply_preferences(&mut self, update: &PreferencesUpdate) {
        if let Some(dietary) = &update.dietary_preferences {
            self.dietary_preferences = dietary.clone();
        }
        if let Some(cuisines) = &update.cuisine_preferences {
            self.cuisine_preferences = cuisines.clone();
        }
        if let Some(allergies) = &update.allergies {
            self.allergies = allergies.clone();
        }
        if update.budget.is_some() {
            self.budget = update.budget;
        }
    }
}
