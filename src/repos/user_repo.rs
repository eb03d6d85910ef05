/*
 * Responsibility
 * - User records backing the credential verifier and the /api/users handlers
 * - `UserStore` is the seam; `InMemoryUserStore` is the process-local implementation
 * - Usernames are unique; a duplicate insert is a `RepoError::Conflict`
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRow>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn create(&self, user: NewUser) -> Result<UserRow, RepoError>;
}

#[derive(Debug, Default)]
struct UserTable {
    next_id: u64,
    rows: BTreeMap<u64, UserRow>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<UserRow>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|row| row.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRow, RepoError> {
        let mut table = self.table.write().await;

        // uniqueness is checked under the write lock so concurrent registrations can't both win
        if table.rows.values().any(|row| row.username == user.username) {
            return Err(RepoError::Conflict("username already exists"));
        }

        table.next_id += 1;
        let row = UserRow {
            id: table.next_id,
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
            enabled: true,
        };
        table.rows.insert(row.id, row.clone());

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles: vec!["ROLE_USER".to_string()],
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_enables() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("alice")).await.unwrap();
        let b = store.create(new_user("bruno")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.enabled && b.enabled);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice")).await.unwrap();

        let err = store.create(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn lookup_by_username() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice")).await.unwrap();

        assert!(store.exists_by_username("alice").await.unwrap());
        assert!(!store.exists_by_username("Alice").await.unwrap());
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }
}
