use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

/// Payload carried by every access token.
///
/// Self-contained: the server keeps no record of issued tokens, so subject and
/// lifetime are all it needs to decide validity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `subject` issued at `issued_at` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Username the token is issued to
    /// * `issued_at` - Issuance time (Unix timestamp)
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with `exp = iat + ttl`
    pub fn for_subject(subject: impl ToString, issued_at: i64, ttl: Duration) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }

    /// Check if the token is expired at `now`.
    ///
    /// Expiry is strict: a token is already invalid at the instant `now == exp`.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject() {
        let claims = Claims::for_subject("ann", 1_000, Duration::minutes(20));

        assert_eq!(claims.sub, "ann");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp - claims.iat, 20 * 60);
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::for_subject("ann", 0, Duration::seconds(1000));

        assert!(!claims.is_expired(999)); // Not expired
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }
}
