//! First-admin bootstrap on startup.
//!
//! Creates an admin account from `bootstrap.admin_username` and
//! `bootstrap.admin_password` when no active admin exists yet. Idempotent:
//! once any admin exists, it does nothing.

use persistence::entities::UserRoleDb;
use persistence::repositories::UserRepository;
use shared::password::{check_password_policy, hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::BootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

/// Credentials to bootstrap with, when both are configured and non-empty.
fn configured_credentials(config: &BootstrapConfig) -> Option<(&str, &str)> {
    let username = config.admin_username.as_deref().map(str::trim)?;
    let password = config.admin_password.as_deref()?;

    if username.is_empty() {
        return None;
    }
    if password.is_empty() {
        warn!("QM__BOOTSTRAP__ADMIN_USERNAME is set but QM__BOOTSTRAP__ADMIN_PASSWORD is empty - skipping bootstrap");
        return None;
    }
    Some((username, password))
}

/// Bootstrap the admin user if configured and not already done.
///
/// Runs after migrations on startup.
pub async fn bootstrap_admin(pool: &PgPool, config: &BootstrapConfig) -> Result<(), BootstrapError> {
    let Some((username, password)) = configured_credentials(config) else {
        return Ok(());
    };

    let users = UserRepository::new(pool.clone());

    if users.admin_exists().await? {
        info!("Admin user already exists - skipping bootstrap");
        return Ok(());
    }

    if users.find_by_username(username).await?.is_some() {
        warn!(username, "Bootstrap username is taken by a non-admin account - skipping bootstrap");
        return Ok(());
    }

    check_password_policy(password)?;
    let password_hash = hash_password(password)?;

    let admin = users
        .create(username, &password_hash, "Administrator", UserRoleDb::Admin, None)
        .await?;

    info!(user_id = admin.id, username, "Bootstrap admin created");
    Ok(())
}
