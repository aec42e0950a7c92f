//! One-shot startup initialization: ensure the root user exists with at
//! least one credential.

use anyhow::{Context, Result};
use tracing::info;

use stratus_auth::keys::{generate_credentials, hash_password};
use stratus_meta::MetaStore;

use crate::config::ServerConfig;

/// Ensure the configured root user exists and holds a credential.
///
/// If the user is absent it is created as an active admin with a bcrypt
/// password hash. If the user has no credentials, either the configured
/// initial key pair is adopted or a fresh pair is generated and logged once
/// so the operator can capture it.
pub async fn ensure_root_user(meta: &MetaStore, config: &ServerConfig) -> Result<()> {
    let user = match stratus_meta::users::get_user_by_username(meta.pool(), &config.root_user)
        .await
        .context("looking up root user")?
    {
        Some(user) => user,
        None => {
            let password_hash =
                hash_password(&config.root_password).context("hashing root password")?;
            let user = stratus_meta::users::create_user(
                meta.pool(),
                &config.root_user,
                &password_hash,
                None,
                true,
            )
            .await
            .context("creating root user")?;
            info!(username = %user.username, "created root user");
            user
        }
    };

    let credentials = stratus_meta::credentials::get_credentials_by_user_id(meta.pool(), user.id)
        .await
        .context("listing root credentials")?;
    if !credentials.is_empty() {
        return Ok(());
    }

    let (access_key, secret_key) = match (&config.init_access_key, &config.init_secret_key) {
        (Some(access), Some(secret)) => {
            info!("adopting initial credentials from configuration");
            (access.clone(), secret.clone())
        }
        _ => {
            let (access, secret) = generate_credentials();
            info!(access_key = %access, secret_key = %secret, "generated root credentials; store them now");
            (access, secret)
        }
    };

    stratus_meta::credentials::create_credential(
        meta.pool(),
        user.id,
        &access_key,
        &secret_key,
        Some("Root credentials"),
        None,
    )
    .await
    .context("creating root credential")?;

    info!(username = %user.username, access_key = %access_key, "root credential ready");
    Ok(())
}
