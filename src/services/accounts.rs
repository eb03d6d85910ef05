/*
 * Responsibility
 * - Account creation shared by the /api/users handlers and the start-up admin seed
 * - Password hashing runs on the blocking pool; the store only ever sees the hash
 */
use std::sync::Arc;

use tracing::{error, info};

use crate::error::AppError;
use crate::repos::{NewUser, UserRow, UserStore};
use crate::services::auth::PasswordHasher;
use crate::services::auth::principal::{ROLE_ADMIN, ROLE_USER};

/// Roles granted to a new account: everyone is a user, admins additionally get `ROLE_ADMIN`.
pub fn roles_for(admin: bool) -> Vec<String> {
    let mut roles = vec![ROLE_USER.to_string()];
    if admin {
        roles.push(ROLE_ADMIN.to_string());
    }
    roles
}

pub async fn hash_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "password hash worker failed");
            AppError::Internal
        })?
        .map_err(AppError::from)
}

pub async fn create_account(
    users: &dyn UserStore,
    hasher: Arc<dyn PasswordHasher>,
    username: &str,
    password: &str,
    admin: bool,
) -> Result<UserRow, AppError> {
    let password_hash = hash_password(hasher, password.to_owned()).await?;

    let row = users
        .create(NewUser {
            username: username.to_owned(),
            password_hash,
            roles: roles_for(admin),
        })
        .await?;

    info!(user_id = row.id, username = %row.username, admin, "account created");
    Ok(row)
}
