use auth::IssuedToken;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub const TOKEN_TYPE: &str = "Bearer";

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let issued = state
        .user_service
        .login(&body.username, &body.password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData::try_from(issued)?,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<IssuedToken> for LoginResponseData {
    type Error = ApiError;

    fn try_from(issued: IssuedToken) -> Result<Self, Self::Error> {
        let expires_at = DateTime::from_timestamp(issued.expires_at, 0).ok_or_else(|| {
            ApiError::InternalServerError(format!(
                "Token expiry out of range: {}",
                issued.expires_at
            ))
        })?;

        Ok(Self {
            token: issued.access_token,
            token_type: TOKEN_TYPE,
            expires_at,
        })
    }
}
