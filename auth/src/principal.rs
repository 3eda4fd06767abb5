use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Authority granted to every registered user.
pub const USER_AUTHORITY: &str = "USER";

/// Resolved authentication identity.
///
/// Read-only projection of a stored user record, built fresh for every lookup
/// and owned by the request that triggered it.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
    credential_hash: String,
    authorities: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(
        username: impl Into<String>,
        credential_hash: impl Into<String>,
        authorities: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            credential_hash: credential_hash.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Stored password hash (PHC string).
    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .field("credential_hash", &"<redacted>")
            .field("authorities", &self.authorities)
            .finish()
    }
}

/// Error type for principal lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("User does not exist with the username: {0}")]
    NotFound(String),

    #[error("Principal lookup failed: {0}")]
    Unavailable(String),
}
