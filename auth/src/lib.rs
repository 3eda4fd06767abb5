//! Stateless bearer-token authentication
//!
//! Building blocks shared by services that authenticate users with signed
//! tokens instead of server-side sessions:
//! - Password hashing (Argon2id)
//! - Token issuance and validation (HS256 JWT, strict expiry)
//! - Principal resolution through the [`PrincipalSource`] port
//! - The per-request [`AuthenticationPipeline`] and its [`AuthContext`]
//! - Credential verification at login ([`Authenticator`])
//!
//! Services supply the [`PrincipalSource`] over their own user storage and wire
//! the pipeline into their transport layer.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{Argon2Hasher, PasswordHasher};
//!
//! let hasher = Argon2Hasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenIssuer};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::minutes(20));
//! let issued = codec.issue("alice").unwrap();
//! let claims = codec.verify(&issued.access_token, "alice").unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod context;
pub mod jwt;
pub mod password;
pub mod pipeline;
pub mod ports;
pub mod principal;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use context::AuthContext;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::Argon2Hasher;
pub use password::PasswordError;
pub use pipeline::AuthState;
pub use pipeline::AuthenticationPipeline;
pub use pipeline::PipelineError;
pub use pipeline::PipelineOutcome;
pub use pipeline::RejectReason;
pub use ports::PasswordHasher;
pub use ports::PrincipalSource;
pub use ports::TokenIssuer;
pub use ports::TokenValidator;
pub use principal::Principal;
pub use principal::PrincipalError;
pub use principal::USER_AUTHORITY;
