use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{JwtBlacklist, blacklist_key};
use crate::jwt::TokenClaims;

pub async fn init_redis_connection(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
    let mut conn = client
        .get_connection_manager()
        .await
        .context("Failed to get Redis connection")?;

    let _: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .context("Failed to ping Redis")?;

    Ok(conn)
}

pub struct RedisJwtBlacklist {
    conn: ConnectionManager,
}

impl RedisJwtBlacklist {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl JwtBlacklist for RedisJwtBlacklist {
    async fn add_jwt_to_blacklist(&self, claims: &TokenClaims) -> Result<()> {
        let ttl = claims.remaining_secs();
        if ttl == 0 {
            return Ok(());
        }

        let mut redis = self.conn.clone();
        let key = blacklist_key(claims);
        let now = Utc::now().timestamp();
        let _: () = redis
            .set_ex(&key, now, ttl as u64)
            .await
            .context("Failed to blacklist token")?;
        Ok(())
    }

    async fn check_jwt_in_blacklist(&self, claims: &TokenClaims) -> Result<bool> {
        let mut redis = self.conn.clone();
        let key = blacklist_key(claims);
        let exists: bool = redis
            .exists(&key)
            .await
            .context("Failed to check token blacklist")?;
        Ok(exists)
    }
}
