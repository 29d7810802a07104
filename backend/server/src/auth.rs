//! # Admin access
//!
//! The admin password is never stored, only its argon2 PHC hash (`ADMIN_PASSWORD_HASH`).
//! A successful login issues a short lived HS256 token that every admin route checks server-side.
//!
//! Generate a hash with `process hash-password`.
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::State};

pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalError(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self) -> Result<String, AppError> {
        let iat = now();
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalError(format!("Failed to issue token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            let message = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidSignature => "Invalid signature",
                _ => "Invalid token",
            };
            AppError::AuthError(message.to_string())
        })?;

        if data.claims.sub != ADMIN_SUBJECT {
            return Err(AppError::AuthError("Invalid token".to_string()));
        }

        Ok(data.claims)
    }
}

pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for routes only an authenticated admin may call.
pub struct Admin(pub Claims);

impl FromRequestParts<Arc<State>> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<State>,
    ) -> Result<Self, Self::Rejection> {
        let issuer = state
            .tokens
            .as_ref()
            .ok_or_else(|| AppError::AuthError("Admin access is disabled".to_string()))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = bearer_token(header)
            .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

        Ok(Admin(issuer.verify(token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(matches!(
            verify_password("password", "not-a-valid-hash"),
            Err(AppError::InternalError(_))
        ));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let issuer = TokenIssuer::new(SECRET, u64::MAX);
        let token = issuer.issue().unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp, u64::MAX);
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(SECRET, 60);
        let token = issuer.issue().unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, ADMIN_SUBJECT);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = TokenIssuer::new(SECRET, 60).issue().unwrap();
        let other = TokenIssuer::new("another-secret-that-is-also-32-characters", 60);

        assert!(other.verify(&token).is_err());
        assert!(other.verify("garbage").is_err());
    }

    #[test]
    fn test_rejects_expired() {
        let issuer = TokenIssuer::new(SECRET, 60);
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now() - 120,
            exp: now() - 60,
        };
        let token = encode(&Header::default(), &claims, &issuer.encoding).unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(AppError::AuthError(message)) if message == "Token expired"
        ));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
