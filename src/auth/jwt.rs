use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
    /// Set on refresh tokens so two issued in the same second still differ.
    #[serde(default)]
    pub jti: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn sign(user_id: Uuid, email: &str, token_type: TokenType, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let (ttl, jti) = match token_type {
        TokenType::Access => (config.jwt_access_ttl_secs, None),
        TokenType::Refresh => (config.jwt_refresh_ttl_secs, Some(Uuid::new_v4())),
    };
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + Duration::seconds(ttl)).timestamp(),
        iat: now.timestamp(),
        token_type,
        jti,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create {:?} token: {}", token_type, e)))
}

pub fn create_token_pair(user_id: Uuid, email: &str, config: &Config) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: sign(user_id, email, TokenType::Access, config)?,
        refresh_token: sign(user_id, email, TokenType::Refresh, config)?,
        expires_in: config.jwt_access_ttl_secs,
    })
}

/// SHA-256 of a raw token, lowercase hex. Only hashes are stored.
pub fn hash_token(raw_token: &str) -> String {
    hex::encode(Sha256::digest(raw_token.as_bytes()))
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_round_trip() {
        let config = Config::for_tests();
        let user_id = Uuid::new_v4();
        let pair = create_token_pair(user_id, "ana@example.com", &config).unwrap();

        let access = verify_token(&pair.access_token, &config).unwrap();
        assert_eq!(access.claims.sub, user_id);
        assert_eq!(access.claims.token_type, TokenType::Access);
        assert!(access.claims.jti.is_none());

        let refresh = verify_token(&pair.refresh_token, &config).unwrap();
        assert_eq!(refresh.claims.token_type, TokenType::Refresh);
        assert!(refresh.claims.jti.is_some());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = Config::for_tests();
        let pair = create_token_pair(Uuid::new_v4(), "a@b.co", &config).unwrap();

        let mut other = Config::for_tests();
        other.jwt_secret = "a-completely-different-secret".into();
        assert!(matches!(
            verify_token(&pair.access_token, &other),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_hash_token_deterministic() {
        let h1 = hash_token("test-refresh-token-value");
        assert_eq!(h1, hash_token("test-refresh-token-value"));
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, hash_token("token-b"));
    }
}
