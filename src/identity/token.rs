//! Bearer token issuance and verification.
//!
//! Tokens are stateless HMAC-signed JWTs carrying the principal's email as
//! the subject, the role tag, and an expiry. Nothing is tracked server-side;
//! a token is valid exactly when its signature verifies under the configured
//! algorithm and its expiry has not passed. Every decode failure collapses to
//! the one undifferentiated credential error so callers cannot distinguish a
//! forged token from an expired one.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use super::principal::RoleTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email.
    pub sub: String,
    /// Role tag, "user" or "owner".
    pub user_type: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

pub struct TokenIssuer {
    secret: String,
    algorithm: Algorithm,
    default_ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, default_ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        // No clock-skew leeway: an expired token is expired
        validation.leeway = 0;
        Self {
            secret: secret.into(),
            algorithm,
            default_ttl: Duration::minutes(default_ttl_minutes),
            validation,
        }
    }

    /// Sign a token for `subject` with the given role. `ttl` overrides the
    /// configured default lifetime when provided.
    pub fn issue(&self, subject: &str, role: RoleTag, ttl: Option<Duration>) -> AppResult<String> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: subject.to_string(),
            user_type: role.as_str().to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal("token_encode_error".to_string(), e.to_string()))
    }

    /// Verify signature, algorithm and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::invalid_credentials())
    }
}
