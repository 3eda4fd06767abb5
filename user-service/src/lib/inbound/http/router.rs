use std::sync::Arc;
use std::time::Duration;

use auth::AuthenticationPipeline;
use auth::TokenCodec;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_all::get_all;
use super::handlers::login::login;
use super::handlers::signup::signup;
use super::handlers::ApiError;
use super::middleware::authenticate;
use super::middleware::require_authentication;
use super::policy::AccessPolicy;
use crate::domain::user::principal::UserPrincipalSource;
use crate::domain::user::service::UserService;
use crate::outbound::repositories::UserStore;

pub type UserPipeline = AuthenticationPipeline<UserPrincipalSource<UserStore>, TokenCodec>;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<UserStore>>,
    pub pipeline: Arc<UserPipeline>,
    pub access_policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Wire the service and the authentication pipeline over one store and
    /// one token codec.
    pub fn new(store: Arc<UserStore>, token_codec: Arc<TokenCodec>) -> Self {
        let principals = Arc::new(UserPrincipalSource::new(Arc::clone(&store)));
        let user_service = Arc::new(UserService::new(
            store,
            Arc::clone(&principals),
            Arc::clone(&token_codec),
        ));
        let pipeline = Arc::new(AuthenticationPipeline::new(principals, token_codec));

        Self {
            user_service,
            pipeline,
            access_policy: Arc::new(AccessPolicy::default()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // Layers wrap outwards: the last one added sees the request first
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/get-all", get(get_all))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_authentication,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
