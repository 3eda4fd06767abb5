use auth::AuthContext;
use auth::AuthState;
use auth::Principal;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Runs the authentication pipeline and stores the resulting [`AuthContext`]
/// in the request extensions.
///
/// Never rejects on bad or missing tokens; only a principal store failure
/// ends the request here.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let context = req
        .extensions_mut()
        .remove::<AuthContext>()
        .unwrap_or_default();

    let outcome = state
        .pipeline
        .run(authorization.as_deref(), context)
        .await
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    match outcome.state {
        AuthState::Rejected(reason) => {
            tracing::warn!(reason = ?reason, path = %req.uri().path(), "Bearer token rejected");
        }
        other => tracing::debug!(state = ?other, "Authentication pipeline finished"),
    }

    req.extensions_mut().insert(outcome.context);
    Ok(next.run(req).await)
}

/// Applies the [`AccessPolicy`](super::policy::AccessPolicy) after
/// [`authenticate`] has run.
pub async fn require_authentication(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path();
    if !state
        .access_policy
        .admits(path, req.extensions().get::<AuthContext>())
    {
        tracing::info!(path = %path, "Unauthenticated request to protected route");
        return Err(ApiError::authentication_required());
    }

    Ok(next.run(req).await)
}

/// Extractor for the principal established by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::principal)
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(ApiError::authentication_required)
    }
}
