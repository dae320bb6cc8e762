use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::redis_service::JwtBlacklist;

/// Shared handles injected into every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    pub blacklist: Arc<dyn JwtBlacklist>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Arc<Config>,
        blacklist: Arc<dyn JwtBlacklist>,
    ) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.access_token_lifetime_secs,
            config.refresh_token_lifetime_secs,
        );
        Self {
            db,
            config,
            jwt,
            blacklist,
        }
    }
}
