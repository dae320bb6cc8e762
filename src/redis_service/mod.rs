pub mod memory;
pub mod redis_service;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::InMemoryJwtBlacklist;
pub use redis_service::{RedisJwtBlacklist, init_redis_connection};

use crate::jwt::TokenClaims;

/// Revoked refresh tokens, keyed by owner and `jti`, kept until the token would expire anyway.
#[async_trait]
pub trait JwtBlacklist: Send + Sync {
    async fn add_jwt_to_blacklist(&self, claims: &TokenClaims) -> Result<()>;

    async fn check_jwt_in_blacklist(&self, claims: &TokenClaims) -> Result<bool>;
}

pub(crate) fn blacklist_key(claims: &TokenClaims) -> String {
    format!("jwt:blacklist:{}:{}", claims.sub, claims.jti)
}
