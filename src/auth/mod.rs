use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod password;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("invalid token: {0}")]
    Invalid(String),
}

pub fn issue_token(user_id: Uuid, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "unit-test-secret".to_string(),
            jwt_expiry_hours: 1,
        }
    }

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, &security()).unwrap();
        let claims = verify_token(&token, "unit-test-secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = issue_token(Uuid::new_v4(), &security()).unwrap();
        assert!(matches!(verify_token(&token, "other-secret"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_token_fails_verification() {
        assert!(matches!(verify_token("not.a.token", "unit-test-secret"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_refused() {
        let mut config = security();
        config.jwt_secret = String::new();
        assert!(matches!(issue_token(Uuid::new_v4(), &config), Err(TokenError::MissingSecret)));
    }
}
