use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponse;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::models::Username;

pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequestBody>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    // A name that fails validation cannot have a verification record.
    let username = Username::new(body.user_name)
        .map_err(|_| ApiError::NotFound("Verification code not found".to_string()))?;

    state
        .user_service
        .redeem_verification(&username, &body.verification_code)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponse::new("Verified successfully"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyRequestBody {
    user_name: String,
    verification_code: String,
}
