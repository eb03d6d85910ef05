use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::repos::UserStore;
use crate::services::auth::password::{PasswordHashError, PasswordHasher};
use crate::services::auth::principal::Principal;

/// Verified against when the username is unknown, so both branches pay for one hash check.
const DUMMY_PASSWORD: &str = "timing-equaliser-not-a-real-password";

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown user, disabled user or wrong password. Deliberately not distinguished.
    #[error("invalid credentials")]
    Rejected,
    #[error("credential backend failure: {0}")]
    Backend(String),
}

/// Turns a username/password pair into a `Principal`.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<Principal, CredentialError>;
}

/// `CredentialVerifier` backed by a `UserStore` and a `PasswordHasher`.
pub struct StoreCredentialVerifier {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: String,
}

impl std::fmt::Debug for StoreCredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentialVerifier").finish_non_exhaustive()
    }
}

impl StoreCredentialVerifier {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, PasswordHashError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            users,
            hasher,
            dummy_hash,
        })
    }

    async fn password_matches(&self, password: &str, hash: String) -> Result<bool, CredentialError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| CredentialError::Backend(format!("hash worker: {e}")))?
            .map_err(|e| CredentialError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CredentialVerifier for StoreCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<Principal, CredentialError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| CredentialError::Backend(e.to_string()))?;

        let hash = match &user {
            Some(row) => row.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let matches = self.password_matches(password, hash).await?;

        match user {
            Some(row) if matches && row.enabled => Ok(Principal::new(row.username, row.roles)),
            _ => Err(CredentialError::Rejected),
        }
    }
}
