//! Staff JWT authentication middleware.
//!
//! `require_user_auth` guards every staff route; `require_admin` is layered
//! inside it on `/api/admin/*`.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::Role;
use shared::jwt::JwtConfig;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// Authenticated staff member extracted from a validated token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: i64,
    pub role: Role,
    pub branch_id: Option<i64>,
    /// JWT ID (jti), logged for session tracing.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the staff identity it carries.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id = claims
            .user_id()
            .map_err(|_| "Invalid user ID in token".to_string())?;
        let role = claims.role.parse::<Role>()?;

        Ok(UserAuth {
            user_id,
            role,
            branch_id: claims.branch_id,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from JwtAuthConfig.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
        JwtConfig::with_leeway(
            &config.secret,
            config.access_token_expiry_secs,
            config.leeway_secs,
        )
        .map_err(|e| format!("Failed to initialize JWT config: {}", e))
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(req_headers: &axum::http::HeaderMap) -> Option<&str> {
    req_headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Middleware that requires a valid staff JWT.
///
/// The authenticated identity is stored in request extensions for handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return ApiError::Unauthorized("Missing or invalid Authorization header".into())
            .into_response();
    };

    match UserAuth::validate(&state.jwt, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".into()).into_response()
        }
    }
}

/// Middleware that rejects authenticated staff who are not admins.
///
/// Must run after `require_user_auth`.
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<UserAuth>() {
        Some(auth) if auth.is_admin() => next.run(req).await,
        Some(auth) => {
            tracing::warn!(user_id = auth.user_id, "Non-admin attempted admin route");
            ApiError::Forbidden("Admin role required".into()).into_response()
        }
        None => ApiError::Unauthorized("Authentication required".into()).into_response(),
    }
}
