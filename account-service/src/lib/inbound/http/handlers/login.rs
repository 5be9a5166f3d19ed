use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::models::Username;

pub async fn login(
    State(state): State<AppState>,
    Form(body): Form<LoginRequestBody>,
) -> Result<ApiSuccess<AccessTokenResponseData>, ApiError> {
    // A name that fails validation cannot belong to any user.
    let username = Username::new(body.username)
        .map_err(|_| ApiError::Unauthorized("User not found".to_string()))?;

    let access_token = state
        .user_service
        .login(&username, &body.password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AccessTokenResponseData {
            access_token,
            token_type: "bearer".to_string(),
        },
    ))
}

/// Form-encoded credentials, as submitted by an OAuth2-style password flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenResponseData {
    pub access_token: String,
    pub token_type: String,
}
