use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::repositories::UserRepository;
use crate::utils::validation::normalize_email;

/// Creates the configured superuser on first start.
pub async fn initialize_admin_user(db: &DatabaseConnection, config: &Config) -> Result<()> {
    // Bootstrap is not subject to the registration domain blocklist
    let admin_email = normalize_email(&config.admin_email, &[])
        .context("ADMIN_EMAIL is not a valid email address")?;
    let repository = UserRepository::new(db).with_bcrypt_cost(config.bcrypt_cost);

    let existing_admin = repository
        .find_by_email(&admin_email)
        .await
        .context("Failed to check existing admin")?;

    if existing_admin.is_some() {
        tracing::info!("Admin user already exists, skipping initialization");
        return Ok(());
    }

    tracing::info!("Creating default admin user...");
    repository
        .create_superuser(
            admin_email.clone(),
            "System".to_string(),
            "Administrator".to_string(),
            config.admin_password.clone(),
        )
        .await
        .context("Failed to insert admin user")?;

    tracing::info!("Admin user created: {}", admin_email);
    tracing::warn!("Please change the default admin password after first login");

    Ok(())
}
