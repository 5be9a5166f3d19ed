use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: Username,
}

/// Middleware that validates bearer tokens and resolves the caller.
///
/// Every failure mode (missing header, malformed or expired token, missing
/// subject claim, subject that resolves to no user) collapses to the same
/// 401 response; the specific reason is only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!("Token validation failed: {}", e);
        unauthorized()
    })?;

    let subject = claims.require_subject().map_err(|e| {
        tracing::warn!("Token validation failed: {}", e);
        unauthorized()
    })?;

    let username = Username::new(subject.to_string()).map_err(|e| {
        tracing::warn!("Token subject is not a valid username: {}", e);
        unauthorized()
    })?;

    let user = state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve token subject: {}", e);
            unauthorized()
        })?
        .ok_or_else(|| {
            tracing::warn!("Token subject '{}' resolves to no user", username);
            unauthorized()
        })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}

/// Enforce resource ownership: the caller must be the target user.
///
/// # Errors
/// * `Forbidden` - Caller does not own the target resource
pub fn authorize(caller: &AuthenticatedUser, target_user_id: &UserId) -> Result<(), ApiError> {
    if caller.user_id != *target_user_id {
        return Err(ApiError::Forbidden(
            "You do not have permission to update this user".to_string(),
        ));
    }

    Ok(())
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            unauthorized()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        tracing::warn!("Authorization header is not valid UTF-8");
        unauthorized()
    })?;

    if !auth_str.starts_with("Bearer ") {
        tracing::warn!("Authorization header is not a bearer token");
        return Err(unauthorized());
    }

    Ok(auth_str.trim_start_matches("Bearer "))
}

fn unauthorized() -> Response {
    ApiError::Unauthorized("Could not validate credentials".to_string()).into_response()
}
