use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Ok(Uuid::parse_str(&self.sub)?)
    }

    /// Seconds until expiry, never negative.
    pub fn remaining_secs(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// An access/refresh pair issued together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    access_lifetime: i64,
    refresh_lifetime: i64,
}

impl JwtManager {
    pub fn new(secret: &str, access_lifetime: i64, refresh_lifetime: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            access_lifetime,
            refresh_lifetime,
        }
    }

    pub fn access_lifetime(&self) -> i64 {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> i64 {
        self.refresh_lifetime
    }

    pub fn create_jwt(&self, user_id: &Uuid, token_type: TokenType) -> Result<String> {
        let now = Utc::now().timestamp();
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let claims = TokenClaims {
            sub: user_id.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn create_pair(&self, user_id: &Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.create_jwt(user_id, TokenType::Access)?,
            refresh: self.create_jwt(user_id, TokenType::Refresh)?,
        })
    }

    /// Decodes and checks signature, expiry and the expected token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<TokenClaims>(token, &self.decoding, &validation)?;

        if data.claims.token_type != expected {
            anyhow::bail!("Token has wrong type");
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips_claims() {
        let manager = JwtManager::new("test-secret", 60, 3600);
        let user_id = Uuid::new_v4();

        let token = manager.create_jwt(&user_id, TokenType::Access).unwrap();
        let claims = manager.verify(&token, TokenType::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access() {
        let manager = JwtManager::new("test-secret", 60, 3600);
        let pair = manager.create_pair(&Uuid::new_v4()).unwrap();

        assert!(manager.verify(&pair.refresh, TokenType::Access).is_err());
        assert!(manager.verify(&pair.refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtManager::new("one-secret", 60, 3600);
        let verifier = JwtManager::new("another-secret", 60, 3600);
        let token = issuer.create_jwt(&Uuid::new_v4(), TokenType::Access).unwrap();

        assert!(verifier.verify(&token, TokenType::Access).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = JwtManager::new("test-secret", -10, 3600);
        let token = manager.create_jwt(&Uuid::new_v4(), TokenType::Access).unwrap();

        assert!(manager.verify(&token, TokenType::Access).is_err());
    }

    #[test]
    fn each_token_gets_its_own_jti() {
        let manager = JwtManager::new("test-secret", 60, 3600);
        let user_id = Uuid::new_v4();
        let first = manager.create_jwt(&user_id, TokenType::Refresh).unwrap();
        let second = manager.create_jwt(&user_id, TokenType::Refresh).unwrap();

        let first = manager.verify(&first, TokenType::Refresh).unwrap();
        let second = manager.verify(&second, TokenType::Refresh).unwrap();
        assert_ne!(first.jti, second.jti);
    }
}
