use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::OnceCell;

pub static DATABASE_CONNECTION: OnceCell<DatabaseConnection> = OnceCell::const_new();

pub async fn get_database_connection(database_url: &str) -> Result<&'static DatabaseConnection> {
    DATABASE_CONNECTION
        .get_or_try_init(|| async {
            let mut opt = ConnectOptions::new(database_url.to_owned());
            opt.max_connections(20)
                .min_connections(1)
                .connect_timeout(Duration::from_secs(8))
                .sqlx_logging(false);

            Database::connect(opt)
                .await
                .context("Failed to connect to database")
        })
        .await
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
