use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{JwtBlacklist, blacklist_key};
use crate::jwt::TokenClaims;

/// Process-local blacklist, used when Redis is unreachable at startup.
#[derive(Default)]
pub struct InMemoryJwtBlacklist {
    // key -> unix timestamp after which the entry is dropped
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryJwtBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JwtBlacklist for InMemoryJwtBlacklist {
    async fn add_jwt_to_blacklist(&self, claims: &TokenClaims) -> Result<()> {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(blacklist_key(claims), claims.exp);
        Ok(())
    }

    async fn check_jwt_in_blacklist(&self, claims: &TokenClaims) -> Result<bool> {
        let now = Utc::now().timestamp();
        let entries = self.entries.read().await;
        Ok(entries
            .get(&blacklist_key(claims))
            .is_some_and(|expires_at| *expires_at > now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::TokenType;

    fn claims(jti: &str, exp: i64) -> TokenClaims {
        TokenClaims {
            sub: "7f1c1d2e-0000-4000-8000-000000000001".to_string(),
            token_type: TokenType::Refresh,
            jti: jti.to_string(),
            iat: Utc::now().timestamp(),
            exp,
        }
    }

    #[tokio::test]
    async fn blacklisted_token_is_reported() {
        let blacklist = InMemoryJwtBlacklist::new();
        let revoked = claims("a", Utc::now().timestamp() + 600);
        let other = claims("b", Utc::now().timestamp() + 600);

        blacklist.add_jwt_to_blacklist(&revoked).await.unwrap();

        assert!(blacklist.check_jwt_in_blacklist(&revoked).await.unwrap());
        assert!(!blacklist.check_jwt_in_blacklist(&other).await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_ignored() {
        let blacklist = InMemoryJwtBlacklist::new();
        let stale = claims("old", Utc::now().timestamp() - 1);

        blacklist.add_jwt_to_blacklist(&stale).await.unwrap();

        assert!(!blacklist.check_jwt_in_blacklist(&stale).await.unwrap());
    }
}
