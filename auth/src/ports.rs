use async_trait::async_trait;

use crate::jwt::IssuedToken;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::principal::Principal;
use crate::principal::PrincipalError;

/// Loads authentication identities from wherever user records live.
#[async_trait]
pub trait PrincipalSource: Send + Sync + 'static {
    /// Resolve the principal for `username`.
    ///
    /// # Errors
    /// * `NotFound` - No user with this username
    /// * `Unavailable` - Backing store failed
    async fn load_principal(&self, username: &str) -> Result<Principal, PrincipalError>;
}

/// Mints access tokens.
pub trait TokenIssuer: Send + Sync + 'static {
    /// Issue a token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError>;
}

/// Checks presented access tokens.
pub trait TokenValidator: Send + Sync + 'static {
    /// Read the subject without checking the signature.
    ///
    /// Returns `None` when the token cannot be parsed.
    fn extract_subject(&self, token: &str) -> Option<String>;

    /// True only if the signature is intact, the subject is the principal's
    /// username and the token has not expired. Never panics.
    fn validate(&self, token: &str, principal: &Principal) -> bool;
}

/// One-way password hashing.
///
/// Plaintext only ever passes through `hash` and `verify`; nothing else sees it.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash a plaintext password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check `password` against a stored hash.
    ///
    /// # Errors
    /// * `MalformedHash` - The stored hash cannot be parsed
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}
