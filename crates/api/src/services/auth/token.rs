//! Stateless credential tokens.
//!
//! The credential cookie carries a self-contained HS256 token: subject
//! (user id), issued-at, and expiry. Verification is stateless — no
//! session table, just the signature against the server-held secret.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bramble_core::UserId;

use super::AuthError;

/// Claims embedded in the credential token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject — the user id.
    sub: String,
    /// Issued at (unix timestamp).
    iat: i64,
    /// Expiry (unix timestamp).
    exp: i64,
}

/// Sign a credential token for a user.
///
/// # Errors
///
/// Returns [`AuthError::TokenCreation`] if signing fails.
pub fn issue(user_id: UserId, secret: &SecretString, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenCreation)
}

/// Verify a credential token and return the subject user id.
///
/// # Errors
///
/// Returns [`AuthError::TokenExpired`] for an expired token and
/// [`AuthError::TokenInvalid`] for any other verification failure,
/// including a tampered signature or a malformed subject.
pub fn verify(token: &str, secret: &SecretString) -> Result<UserId, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    })?;

    let id = data
        .claims
        .sub
        .parse::<i32>()
        .map_err(|_| AuthError::TokenInvalid)?;

    Ok(UserId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kX9#mP2$vL8@qR4!wN6^zT1&yB3*uJ5%")
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let token = issue(UserId::new(42), &secret(), Duration::days(1)).expect("issue");
        let user_id = verify(&token, &secret()).expect("verify");
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue(UserId::new(42), &secret(), Duration::seconds(-120)).expect("issue");
        let err = verify(&token, &secret()).expect_err("expired");
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(UserId::new(42), &secret(), Duration::days(1)).expect("issue");
        let other = SecretString::from("aQ7!rT0*uW4^zC6#pE9$sD2@fG5&hK8%");
        let err = verify(&token, &other).expect_err("wrong secret");
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue(UserId::new(42), &secret(), Duration::days(1)).expect("issue");
        let tampered = format!("{token}x");
        let err = verify(&tampered, &secret()).expect_err("tampered");
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = verify("definitely-not-a-token", &secret()).expect_err("garbage");
        assert!(matches!(err, AuthError::TokenInvalid));
    }
}
