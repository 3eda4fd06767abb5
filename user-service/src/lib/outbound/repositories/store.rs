use async_trait::async_trait;

use super::memory::InMemoryUserRepository;
use super::postgres::PostgresUserRepository;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Credential store selected at startup.
///
/// Wraps the available repository implementations so the rest of the
/// service is written against one concrete type while the backend stays a
/// configuration choice.
pub enum UserStore {
    Postgres(PostgresUserRepository),
    Memory(InMemoryUserRepository),
}

impl UserStore {
    pub fn memory() -> Self {
        Self::Memory(InMemoryUserRepository::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            UserStore::Postgres(_) => "postgres",
            UserStore::Memory(_) => "memory",
        }
    }

    pub fn as_memory(&self) -> Option<&InMemoryUserRepository> {
        match self {
            UserStore::Memory(repository) => Some(repository),
            UserStore::Postgres(_) => None,
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: User) -> Result<User, UserError> {
        match self {
            UserStore::Postgres(repository) => repository.create(user).await,
            UserStore::Memory(repository) => repository.create(user).await,
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        match self {
            UserStore::Postgres(repository) => repository.find_by_username(username).await,
            UserStore::Memory(repository) => repository.find_by_username(username).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        match self {
            UserStore::Postgres(repository) => repository.list_all().await,
            UserStore::Memory(repository) => repository.list_all().await,
        }
    }
}
