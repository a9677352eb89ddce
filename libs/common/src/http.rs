//! HTTP plumbing shared by the backend clients
//!
//! The backend wraps every JSON body in a `{ success, message, ... }`
//! envelope. Helpers here build the shared `reqwest` client, unwrap that
//! envelope and translate error statuses into [`ClientError`].

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Raw bearer credential
///
/// Always holds the token without the `Bearer ` prefix; the prefix is only
/// added by [`BearerToken::header_value`].
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a token, stripping a leading `Bearer ` if one is present
    pub fn new(token: impl AsRef<str>) -> Self {
        let token = token.as_ref().trim();
        let raw = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();
        BearerToken(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("{}{}", BEARER_PREFIX, self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Build the HTTP client used for every backend call
///
/// The cookie store keeps the session cookie set by login alongside the
/// bearer token.
pub fn build_client(config: &ClientConfig) -> ClientResult<Client> {
    Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Deserialize)]
struct Ack {}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Default mapping from an error status to a [`ClientError`]
pub fn classify_status(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::AuthRejected(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message)
        }
        other => ClientError::server(other.as_u16(), message),
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

async fn read_body<F>(response: Response, classify: F) -> ClientResult<(StatusCode, Vec<u8>)>
where
    F: FnOnce(StatusCode, String) -> ClientError,
{
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    debug!("Backend responded {} ({} bytes)", status, body.len());

    if !status.is_success() {
        return Err(classify(status, error_message(status, &body)));
    }
    Ok((status, body))
}

fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|e| {
        ClientError::server(status.as_u16(), format!("Unexpected response body: {}", e))
    })?;

    if envelope.success == Some(false) {
        let message = envelope
            .message
            .unwrap_or_else(|| "Request was not successful".to_string());
        return Err(ClientError::server(status.as_u16(), message));
    }
    Ok(envelope.data)
}

/// Read a JSON envelope, using `classify` for non-2xx statuses
pub async fn read_json<T, F>(response: Response, classify: F) -> ClientResult<T>
where
    T: DeserializeOwned,
    F: FnOnce(StatusCode, String) -> ClientError,
{
    let (status, body) = read_body(response, classify).await?;
    unwrap_envelope(status, &body)
}

/// Read a response whose body carries nothing but the envelope
pub async fn read_ack<F>(response: Response, classify: F) -> ClientResult<()>
where
    F: FnOnce(StatusCode, String) -> ClientError,
{
    let (status, body) = read_body(response, classify).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    unwrap_envelope::<Ack>(status, &body).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        token: String,
    }

    #[test]
    fn test_bearer_prefix_normalized() {
        let raw = BearerToken::new("abc.def.ghi");
        let prefixed = BearerToken::new("Bearer abc.def.ghi");
        assert_eq!(raw, prefixed);
        assert_eq!(raw.as_str(), "abc.def.ghi");
        assert_eq!(raw.header_value(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_bearer_debug_redacts() {
        let token = BearerToken::new("secret");
        assert!(!format!("{:?}", token).contains("secret"));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, "expired".into()).kind(),
            crate::error::ErrorKind::AuthRejected
        );
        assert_eq!(
            classify_status(StatusCode::CONFLICT, "email taken".into()).kind(),
            crate::error::ErrorKind::Validation
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, "down".into()),
            ClientError::server(502, "down")
        );
    }

    #[test]
    fn test_error_message_prefers_body() {
        let body = br#"{"success":false,"message":"User not found"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "User not found");

        let body = br#"{"error":"Unauthorized"}"#;
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, body), "Unauthorized");

        assert_eq!(error_message(StatusCode::NOT_FOUND, b"<html>"), "Not Found");
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = br#"{"success":true,"token":"abc"}"#;
        let payload: Payload = unwrap_envelope(StatusCode::OK, body).expect("payload");
        assert_eq!(payload.token, "abc");

        let body = br#"{"success":false,"message":"Plan not generated"}"#;
        let err = unwrap_envelope::<Ack>(StatusCode::OK, body).err();
        assert_eq!(err, Some(ClientError::server(200, "Plan not generated")));

        let err = unwrap_envelope::<Payload>(StatusCode::OK, b"{}").err();
        assert!(matches!(err, Some(ClientError::Server { .. })));
    }
}
