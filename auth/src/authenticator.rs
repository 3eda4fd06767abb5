use std::sync::Arc;
use std::sync::OnceLock;

use crate::jwt::IssuedToken;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::ports::PasswordHasher;
use crate::ports::PrincipalSource;
use crate::ports::TokenIssuer;
use crate::principal::PrincipalError;

/// Plaintext hashed once to give unknown usernames a real hash to verify against.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// Credential verifier.
///
/// Checks a username/password pair against the principal source and the
/// password hasher and, on success, mints a token. This is the only place
/// tokens are issued.
pub struct Authenticator<P, H, I>
where
    P: PrincipalSource,
    H: PasswordHasher,
    I: TokenIssuer,
{
    principals: Arc<P>,
    password_hasher: Arc<H>,
    issuer: Arc<I>,
    decoy_hash: Arc<OnceLock<String>>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Principal lookup failed: {0}")]
    Unavailable(String),
}

impl<P, H, I> Authenticator<P, H, I>
where
    P: PrincipalSource,
    H: PasswordHasher,
    I: TokenIssuer,
{
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `principals` - Where identities are resolved from
    /// * `password_hasher` - Hasher the stored credentials were produced with
    /// * `issuer` - Token issuer used after a successful check
    pub fn new(principals: Arc<P>, password_hasher: Arc<H>, issuer: Arc<I>) -> Self {
        Self {
            principals,
            password_hasher,
            issuer,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a password for storage on the blocking thread pool.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = Arc::clone(&self.password_hasher);
        let password = password.to_owned();
        run_blocking(move || hasher.hash(&password)).await
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = Arc::clone(&self.password_hasher);
        let (password, hash) = (password.to_owned(), hash.to_owned());
        run_blocking(move || hasher.verify(&password, &hash)).await
    }

    /// Spend the same hashing work as a real check so unknown usernames do
    /// not answer faster than wrong passwords. The outcome is discarded.
    async fn verify_against_decoy(&self, password: &str) {
        let hasher = Arc::clone(&self.password_hasher);
        let decoy_hash = Arc::clone(&self.decoy_hash);
        let password = password.to_owned();
        let _ = run_blocking(move || {
            let hash = decoy_hash.get_or_init(|| hasher.hash(DECOY_PASSWORD).unwrap_or_default());
            hasher.verify(&password, hash)
        })
        .await;
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `username` - Claimed username
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// Issued token for `username`
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password
    /// * `Password` - Stored hash is unusable
    /// * `Token` - Token generation failed
    /// * `Unavailable` - Principal store failed
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        let principal = match self.principals.load_principal(username).await {
            Ok(principal) => principal,
            Err(PrincipalError::NotFound(_)) => {
                self.verify_against_decoy(password).await;
                tracing::info!(username = %username, "Login rejected: unknown user");
                return Err(AuthenticationError::InvalidCredentials);
            }
            Err(PrincipalError::Unavailable(message)) => {
                return Err(AuthenticationError::Unavailable(message));
            }
        };

        let is_valid = self
            .verify_password(password, principal.credential_hash())
            .await?;

        if !is_valid {
            tracing::info!(username = %username, "Login rejected: wrong password");
            return Err(AuthenticationError::InvalidCredentials);
        }

        let issued = self.issuer.issue(principal.username())?;
        tracing::info!(
            username = %principal.username(),
            expires_at = issued.expires_at,
            "Token issued"
        );

        Ok(issued)
    }
}

/// Argon2 work is CPU-bound; keep it off the async worker threads.
async fn run_blocking<T, F>(task: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}
