use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use university_service::bootstrap::initialize_admin_user;
use university_service::redis_service::{
    InMemoryJwtBlacklist, JwtBlacklist, RedisJwtBlacklist, init_redis_connection,
};
use university_service::state::AppState;
use university_service::static_service::{get_database_connection, run_migrations};
use university_service::{app, config::APP_CONFIG, utils::tracing::init_standard_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    init_standard_tracing(env!("CARGO_CRATE_NAME"));

    tracing::info!("Starting application...");
    let config = Arc::new(APP_CONFIG.clone());

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media_root))?;

    let db_connection = get_database_connection(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(db_connection).await?;
    }

    tracing::info!("Initializing Redis connection...");
    let blacklist: Arc<dyn JwtBlacklist> = match init_redis_connection(&config.redis_url).await {
        Ok(conn) => {
            tracing::info!("Redis connection initialized successfully");
            Arc::new(RedisJwtBlacklist::new(conn))
        }
        Err(e) => {
            tracing::error!("Failed to initialize Redis connection: {}", e);
            tracing::warn!("Continuing with an in-process token blacklist");
            Arc::new(InMemoryJwtBlacklist::new())
        }
    };

    tracing::info!("Checking admin user...");
    if let Err(e) = initialize_admin_user(db_connection, &config).await {
        tracing::error!("Failed to initialize admin user: {:?}", e);
        tracing::warn!("Continuing without admin user initialization...");
    }

    let state = AppState::new(db_connection.clone(), config.clone(), blacklist);
    let app = app::create_app(state)?;

    let http_address = format!("0.0.0.0:{}", config.port);
    tracing::info!("HTTP server listening on {}", &http_address);

    let listener = tokio::net::TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("Failed to bind {http_address}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server error")?;

    Ok(())
}
