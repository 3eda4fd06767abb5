use std::sync::Arc;

use async_trait::async_trait;
use auth::Principal;
use auth::PrincipalError;
use auth::PrincipalSource;
use auth::USER_AUTHORITY;

use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::ports::UserRepository;

/// Resolves authentication principals from stored user records.
pub struct UserPrincipalSource<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> UserPrincipalSource<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }
}

fn principal_of(user: &User) -> Principal {
    Principal::new(
        user.username.as_str(),
        user.password_hash.as_str(),
        [USER_AUTHORITY],
    )
}

#[async_trait]
impl<UR> PrincipalSource for UserPrincipalSource<UR>
where
    UR: UserRepository,
{
    async fn load_principal(&self, username: &str) -> Result<Principal, PrincipalError> {
        // A name that fails validation can never have been stored
        let Ok(key) = Username::new(username.to_string()) else {
            return Err(PrincipalError::NotFound(username.to_string()));
        };

        match self.repository.find_by_username(&key).await {
            Ok(Some(user)) => Ok(principal_of(&user)),
            Ok(None) => {
                tracing::info!(username = %username, "User does not exist");
                Err(PrincipalError::NotFound(username.to_string()))
            }
            Err(e) => Err(PrincipalError::Unavailable(e.to_string())),
        }
    }
}
