//! Authentication endpoints of the meal-planning backend

use async_trait::async_trait;
use common::http::{classify_status, read_ack, read_json};
use common::{BearerToken, ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;

use crate::models::{
    AuthResponse, LoginCredentials, PreferencesUpdate, ProfileUpdate, RegisterProfile, UserProfile,
};

/// Backend calls the session manager depends on
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&self, profile: &RegisterProfile) -> ClientResult<AuthResponse>;

    /// `POST /auth/logout`
    async fn logout(&self, token: Option<&BearerToken>) -> ClientResult<()>;

    /// `PUT /users/profile`
    async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> ClientResult<Option<UserProfile>>;

    /// `PUT /users/preferences`
    async fn update_preferences(
        &self,
        token: &BearerToken,
        update: &PreferencesUpdate,
    ) -> ClientResult<Option<UserProfile>>;
}

#[derive(Deserialize)]
struct UserBody {
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Login refusals come back as 400/401/403/404 depending on the reason
fn classify_login(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND => ClientError::InvalidCredentials(message),
        other => classify_status(other, message),
    }
}

/// HTTP implementation of [`AuthApi`]
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    config: ClientConfig,
}

impl HttpAuthApi {
    /// Create a new client sharing `client`'s connection pool and cookie store
    pub fn new(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthResponse> {
        let url = self.config.api_url("/auth/login");
        debug!("POST {}", url);
        let response = self.client.post(url).json(credentials).send().await?;
        read_json(response, classify_login).await
    }

    async fn register(&self, profile: &RegisterProfile) -> ClientResult<AuthResponse> {
        let url = self.config.api_url("/auth/register");
        debug!("POST {}", url);
        let response = self.client.post(url).json(profile).send().await?;
        read_json(response, classify_status).await
    }

    async fn logout(&self, token: Option<&BearerToken>) -> ClientResult<()> {
        let url = self.config.api_url("/auth/logout");
        debug!("POST {}", url);
        let mut request = self.client.post(url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token.header_value());
        }
        let response = request.send().await?;
        read_ack(response, classify_status).await
    }

    async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> ClientResult<Option<UserProfile>> {
        let url = self.config.api_url("/users/profile");
        debug!("PUT {}", url);
        let response = self
            .client
            .put(url)
            .header(AUTHORIZATION, token.header_value())
            .json(update)
            .send()
            .await?;
        let body: UserBody = read_json(response, classify_status).await?;
        Ok(body.user)
    }

    async fn update_preferences(
        &self,
        token: &BearerToken,
        update: &PreferencesUpdate,
    ) -> ClientResult<Option<UserProfile>> {
        let url = self.config.api_url("/users/preferences");
        debug!("PUT {}", url);
        let response = self
            .client
            .put(url)
            .header(AUTHORIZATION, token.header_value())
            .json(update)
            .send()
            .await?;
        let body: UserBody = read_json(response, classify_status).await?;
        Ok(body.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;

    #[test]
    fn test_classify_login() {
        assert_eq!(
            classify_login(StatusCode::UNAUTHORIZED, "Invalid password".into()),
            ClientError::InvalidCredentials("Invalid password".into())
        );
        assert_eq!(
            classify_login(StatusCode::NOT_FOUND, "No such user".into()).kind(),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(
            classify_login(StatusCode::SERVICE_UNAVAILABLE, "down".into()).kind(),
            ErrorKind::Server
        );
    }
}
