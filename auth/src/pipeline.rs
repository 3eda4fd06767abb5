use std::sync::Arc;

use thiserror::Error;

use crate::context::AuthContext;
use crate::ports::PrincipalSource;
use crate::ports::TokenValidator;
use crate::principal::PrincipalError;

/// Scheme prefix recognised in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No bearer token, or one that could not be parsed.
    TokenAbsent,
    /// The context already carried an identity; nothing was re-validated.
    AlreadyAuthenticated,
    /// A token was presented but did not establish an identity.
    Rejected(RejectReason),
    /// The token was valid for an existing principal.
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Subject does not exist (anymore).
    PrincipalMissing,
    /// Bad signature, wrong subject or expired.
    TokenInvalid,
}

/// Context to hand to the next stage, plus how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub context: AuthContext,
    pub state: AuthState,
}

impl PipelineOutcome {
    fn new(context: AuthContext, state: AuthState) -> Self {
        Self { context, state }
    }
}

/// Pipeline failures that must not be downgraded to "anonymous".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Principal lookup failed: {0}")]
    Unavailable(String),
}

/// Per-request token authentication.
///
/// Decides whether a request carries an identity. It never rejects a request
/// on its own: token and principal failures leave the context untouched and
/// the access policy that runs afterwards denies protected routes.
pub struct AuthenticationPipeline<P, V>
where
    P: PrincipalSource,
    V: TokenValidator,
{
    principals: Arc<P>,
    validator: Arc<V>,
}

impl<P, V> AuthenticationPipeline<P, V>
where
    P: PrincipalSource,
    V: TokenValidator,
{
    pub fn new(principals: Arc<P>, validator: Arc<V>) -> Self {
        Self {
            principals,
            validator,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header value, if any
    /// * `context` - Context established so far for this request
    ///
    /// # Returns
    /// The context for the next stage and the state the run ended in
    ///
    /// # Errors
    /// * `Unavailable` - The principal store failed; the request cannot be
    ///   authenticated either way
    pub async fn run(
        &self,
        authorization: Option<&str>,
        context: AuthContext,
    ) -> Result<PipelineOutcome, PipelineError> {
        let Some(token) = bearer_token(authorization) else {
            return Ok(PipelineOutcome::new(context, AuthState::TokenAbsent));
        };

        let Some(subject) = self.validator.extract_subject(token) else {
            tracing::debug!("Bearer token is unparsable, continuing unauthenticated");
            return Ok(PipelineOutcome::new(context, AuthState::TokenAbsent));
        };

        if context.is_authenticated() {
            return Ok(PipelineOutcome::new(
                context,
                AuthState::AlreadyAuthenticated,
            ));
        }

        let principal = match self.principals.load_principal(&subject).await {
            Ok(principal) => principal,
            Err(PrincipalError::NotFound(_)) => {
                tracing::debug!(username = %subject, "Token subject does not exist");
                return Ok(PipelineOutcome::new(
                    context,
                    AuthState::Rejected(RejectReason::PrincipalMissing),
                ));
            }
            Err(PrincipalError::Unavailable(message)) => {
                tracing::error!(username = %subject, error = %message, "Principal lookup failed");
                return Err(PipelineError::Unavailable(message));
            }
        };

        if !self.validator.validate(token, &principal) {
            return Ok(PipelineOutcome::new(
                context,
                AuthState::Rejected(RejectReason::TokenInvalid),
            ));
        }

        tracing::debug!(username = %principal.username(), "Request authenticated");
        Ok(PipelineOutcome::new(
            context.establish(principal),
            AuthState::Authenticated,
        ))
    }
}

/// Strip the bearer scheme from an `Authorization` header value.
///
/// Returns `None` for any other scheme or an empty token.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
