//! Staff authentication endpoint handlers.

use axum::extract::State;
use domain::models::StaffUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::response::ApiResponse;
use crate::services::auth::LoginResult;
use crate::services::AuthService;

/// Request body for staff login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub session_ended: bool,
}

/// Log in with username and password.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResult>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.as_ref().clone());
    let result = service.login(&request.username, &request.password).await?;
    Ok(ApiResponse::ok(result))
}

/// Log out, closing the caller's open counter session.
///
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<ApiResponse<LogoutResponse>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.as_ref().clone());
    let session_ended = service.logout(auth.user_id).await?;
    Ok(ApiResponse::ok(LogoutResponse { session_ended }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<ApiResponse<StaffUser>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.as_ref().clone());
    Ok(ApiResponse::ok(service.me(auth.user_id).await?))
}
