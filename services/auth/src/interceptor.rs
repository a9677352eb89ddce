//! Request interceptor attaching the bearer token to outgoing calls
//!
//! Every authenticated call takes its token from [`require_token`] before
//! it is sent and passes its result through [`guard`] once it has
//! completed, so a missing token never reaches the wire and a 401 always
//! ends the session.

use common::{BearerToken, ClientError, ClientResult};
use reqwest::{RequestBuilder, header::AUTHORIZATION};
use tracing::warn;

use crate::session::TokenSource;

/// Attach `Authorization: Bearer <jwt>` to a request
pub fn with_bearer(request: RequestBuilder, token: &BearerToken) -> RequestBuilder {
    request.header(AUTHORIZATION, token.header_value())
}

/// The current token, or `AuthRejected` so the request is never built
pub fn require_token(source: &dyn TokenSource) -> ClientResult<BearerToken> {
    source
        .valid_token()
        .ok_or_else(|| ClientError::AuthRejected("No valid session".to_string()))
}

/// Invalidate the session when a completed call was rejected for auth reasons
pub fn guard<T>(source: &dyn TokenSource, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        if e.is_auth_failure() {
            warn!("Request rejected for authentication: {}", e);
            source.invalidate();
        }
    }
    result
}
