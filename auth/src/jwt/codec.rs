use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::ports::TokenIssuer;
use crate::ports::TokenValidator;
use crate::principal::Principal;

/// A freshly minted access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWT (`header.payload.signature`)
    pub access_token: String,

    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

/// Issues and validates signed access tokens.
///
/// Uses HS256 with a process-wide secret. Issuance and validation read the
/// same [`Clock`], and expiry is checked against it rather than the library's
/// own wall-clock check so that `now >= exp` is always rejected, without
/// leeway.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec backed by the system clock.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes)
    /// * `ttl` - Lifetime of every issued token
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Create a codec reading time from `clock`.
    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign claims into a compact token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode a token and check its signature.
    ///
    /// Expiry is not checked here; see [`TokenCodec::verify`].
    ///
    /// # Errors
    /// * `SignatureInvalid` - Signature or algorithm does not match
    /// * `Unparsable` - Token is malformed or its payload is not valid claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(true))
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Decode token without signature verification.
    ///
    /// # Security Warning
    /// Claims returned here are untrusted. Only use them to decide which
    /// principal to load before full validation.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(false))
            .map(|data| data.claims)
            .map_err(|e| TokenError::Unparsable(e.to_string()))
    }

    /// Fully verify a token for `expected_subject`.
    ///
    /// Checks, in order: signature, subject, expiry.
    ///
    /// # Errors
    /// * `SignatureInvalid` - Signature does not match the server secret
    /// * `Unparsable` - Token is malformed
    /// * `SubjectMismatch` - Token was issued to someone else
    /// * `Expired` - `now >= exp`
    pub fn verify(&self, token: &str, expected_subject: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;

        if claims.sub != expected_subject {
            return Err(TokenError::SubjectMismatch {
                expected: expected_subject.to_string(),
                actual: claims.sub,
            });
        }

        if claims.is_expired(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn validation(&self, verify_signature: bool) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        if !verify_signature {
            validation.insecure_disable_signature_validation();
        }
        validation
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Unparsable(e.to_string()),
    }
}

impl TokenIssuer for TokenCodec {
    fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        let claims = Claims::for_subject(subject, self.clock.now(), self.ttl);
        let access_token = self.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            expires_at: claims.exp,
        })
    }
}

impl TokenValidator for TokenCodec {
    fn extract_subject(&self, token: &str) -> Option<String> {
        self.decode_unverified(token).ok().map(|claims| claims.sub)
    }

    fn validate(&self, token: &str, principal: &Principal) -> bool {
        match self.verify(token, principal.username()) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(
                    username = %principal.username(),
                    error = %e,
                    "Token rejected"
                );
                false
            }
        }
    }
}
