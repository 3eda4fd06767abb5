//! In-memory user storage.
//!
//! Keeps records in a [`BTreeMap`] keyed by username behind a tokio
//! [`RwLock`]. Nothing is persisted; intended for development and tests.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<Username, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a record, returning it if it existed.
    ///
    /// Not part of [`UserRepository`]; the service never deletes users.
    pub async fn remove(&self, username: &Username) -> Option<User> {
        self.users.write().await.remove(username)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        match self.users.write().await.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            )),
            Entry::Vacant(slot) => Ok(slot.insert(user).clone()),
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::UserId;

    fn user(username: &str, minutes_ago: i64) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: None,
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("ann", 0)).await.unwrap();

        let found = repository
            .find_by_username(&created.username)
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_without_overwriting() {
        let repository = InMemoryUserRepository::new();
        let original = repository.create(user("ann", 0)).await.unwrap();

        let result = repository.create(user("ann", 0)).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));

        let stored = repository
            .find_by_username(&original.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, original.id);
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("old", 10)).await.unwrap();
        repository.create(user("new", 1)).await.unwrap();

        let users = repository.list_all().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("ann", 0)).await.unwrap();

        assert!(repository.remove(&created.username).await.is_some());
        assert!(repository
            .find_by_username(&created.username)
            .await
            .unwrap()
            .is_none());
        assert!(repository.is_empty().await);
    }
}
