//! Token decoding for client-side expiry checks
//!
//! The client cannot verify signatures; it only needs the `exp` claim to
//! decide whether a stored token is still worth sending. Anything that does
//! not decode as a three-segment JWT carrying `exp` is reported as
//! [`ClientError::MalformedToken`], never as a panic.

use chrono::{DateTime, Utc};
use common::{BearerToken, ClientError, ClientResult};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use std::collections::HashSet;

/// Claims the client reads from a token
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    /// Expiration time, seconds since epoch
    pub exp: u64,
    /// Issued at time
    #[serde(default)]
    pub iat: Option<u64>,
}

fn unverified_validation() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    validation
}

/// Decode the payload segment without verifying the signature
pub fn decode_claims(token: &BearerToken) -> ClientResult<TokenClaims> {
    let segments = token.as_str().split('.').count();
    if segments != 3 {
        return Err(ClientError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments
        )));
    }

    decode::<TokenClaims>(
        token.as_str(),
        &DecodingKey::from_secret(&[]),
        &unverified_validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| ClientError::MalformedToken(e.to_string()))
}

/// Expiry timestamp embedded in the token
pub fn decode_expiry(token: &BearerToken) -> ClientResult<DateTime<Utc>> {
    let claims = decode_claims(token)?;
    i64::try_from(claims.exp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ClientError::MalformedToken(format!("exp out of range: {}", claims.exp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn mint(claims: serde_json::Value) -> BearerToken {
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .expect("token encodes");
        BearerToken::new(token)
    }

    #[test]
    fn test_decode_expiry() {
        let token = mint(json!({ "id": "u1", "iat": 1_700_000_000, "exp": 1_700_003_600 }));
        let expiry = decode_expiry(&token).expect("expiry decodes");
        assert_eq!(expiry.timestamp(), 1_700_003_600);

        let claims = decode_claims(&token).expect("claims decode");
        assert_eq!(claims.iat, Some(1_700_000_000));
    }

    #[test]
    fn test_prefixed_token_decodes() {
        let token = mint(json!({ "exp": 1_700_003_600 }));
        let prefixed = BearerToken::new(format!("Bearer {}", token.as_str()));
        assert_eq!(decode_expiry(&prefixed).ok(), decode_expiry(&token).ok());
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        for raw in ["", "abc", "abc.def", "a.b.c.d", "...."] {
            let result = decode_expiry(&BearerToken::new(raw));
            assert!(
                matches!(result, Err(ClientError::MalformedToken(_))),
                "{:?} should be malformed",
                raw
            );
        }
    }

    #[test]
    fn test_garbage_segments_are_malformed() {
        let result = decode_expiry(&BearerToken::new("!!!.@@@.###"));
        assert!(matches!(result, Err(ClientError::MalformedToken(_))));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let token = mint(json!({ "id": "u1" }));
        assert!(matches!(
            decode_expiry(&token),
            Err(ClientError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_signature_is_not_checked() {
        let token = mint(json!({ "exp": 4_000_000_000u64 }));
        let mut parts: Vec<&str> = token.as_str().split('.').collect();
        parts[2] = "c2lnbmF0dXJl";
        let tampered = BearerToken::new(parts.join("."));
        assert!(decode_expiry(&tampered).is_ok());
    }
}
