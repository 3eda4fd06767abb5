use std::sync::Arc;

use async_trait::async_trait;
use auth::Argon2Hasher;
use auth::Authenticator;
use auth::IssuedToken;
use auth::TokenCodec;
use chrono::Utc;

use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::principal::UserPrincipalSource;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Authenticator<UserPrincipalSource<UR>, Argon2Hasher, TokenCodec>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `principals` - Principal resolver over the same repository
    /// * `token_codec` - Issuer for access tokens
    pub fn new(
        repository: Arc<UR>,
        principals: Arc<UserPrincipalSource<UR>>,
        token_codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            repository,
            authenticator: Authenticator::new(
                principals,
                Arc::new(Argon2Hasher::new()),
                token_codec,
            ),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn signup(&self, command: SignupCommand) -> Result<User, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())
            .await
            .map_err(|e| UserError::Password(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, UserError> {
        // Names that could never be registered are rejected like unknown ones
        if Username::new(username.to_string()).is_err() {
            return Err(UserError::InvalidCredentials);
        }

        self.authenticator
            .login(username, password)
            .await
            .map_err(UserError::from)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use auth::TokenValidator;
    use chrono::Duration;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::domain::user::testing::MockTestUserRepository;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn service_with(
        repository: MockTestUserRepository,
    ) -> (UserService<MockTestUserRepository>, Arc<TokenCodec>) {
        let repository = Arc::new(repository);
        let principals = Arc::new(UserPrincipalSource::new(repository.clone()));
        let codec = Arc::new(TokenCodec::new(SECRET, Duration::minutes(20)));
        (
            UserService::new(repository, principals, codec.clone()),
            codec,
        )
    }

    fn stored_user(username: &str, password: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: None,
            password_hash: Argon2Hasher::new().hash(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_signup_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_ref().map(|e| e.as_str()) == Some("test@example.com")
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password123"
            })
            .times(1)
            .returning(|user| Ok(user));

        let (service, _) = service_with(repository);

        let command = SignupCommand::new(
            Username::new("testuser".to_string()).unwrap(),
            Some(EmailAddress::new("test@example.com".to_string()).unwrap()),
            Password::new("password123".to_string()).unwrap(),
        );

        let user = service.signup(command).await.expect("Signup failed");
        assert_eq!(user.username.as_str(), "testuser");
        // Password is hashed with real Argon2
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let (service, _) = service_with(repository);

        let command = SignupCommand::new(
            Username::new("testuser".to_string()).unwrap(),
            None,
            Password::new("password456".to_string()).unwrap(),
        );

        let result = service.signup(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("ann", "x");

        repository
            .expect_find_by_username()
            .withf(|u| u.as_str() == "ann")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let (service, codec) = service_with(repository);

        let issued = service.login("ann", "x").await.expect("Login failed");
        let principal = auth::Principal::new("ann", "unused", ["USER"]);
        assert!(codec.validate(&issued.access_token, &principal));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("ann", "x");

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let (service, _) = service_with(repository);

        let result = service.login("ann", "not-x").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let (service, _) = service_with(repository);

        let result = service.login("nobody", "x").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_invalid_username_skips_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let (service, _) = service_with(repository);

        let result = service.login("x", "x").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_database_error() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("pool closed".to_string())));

        let (service, _) = service_with(repository);

        let result = service.login("ann", "x").await;
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();
        let users = vec![stored_user("ann", "x"), stored_user("bob", "y")];

        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(users.clone()));

        let (service, _) = service_with(repository);

        let listed = service.list_users().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].username.as_str(), "ann");
    }
}
