/*
 * Responsibility
 * - Users request/response DTOs
 * - validate() covers shape only; username uniqueness needs the store and is checked by the handler
 */
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::repos::UserRow;

const USERNAME_MIN: usize = 4;
const USERNAME_MAX: usize = 12;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    // write-only; ignored by /register
    #[serde(default)]
    pub admin: bool,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let len = self.username.chars().count();
        if self.username.trim().is_empty() {
            errors.insert("username".into(), "field username must not be blank".into());
        } else if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            errors.insert(
                "username".into(),
                format!("field username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"),
            );
        }

        if self.password.trim().is_empty() {
            errors.insert("password".into(), "field password must not be blank".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public view of a user. The password hash is never serialized.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub roles: Vec<String>,
    pub enabled: bool,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            roles: row.roles,
            enabled: row.enabled,
        }
    }
}
