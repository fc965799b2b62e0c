//! Staff JWT authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{bearer_token, UserAuth as UserAuthData};

/// Authenticated staff member.
///
/// Reads the identity inserted by `require_user_auth`, or validates the
/// Bearer token itself when the route is not behind that middleware.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: i64,
    pub role: Role,
    pub branch_id: Option<i64>,
}

impl UserAuth {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<UserAuthData> for UserAuth {
    fn from(data: UserAuthData) -> Self {
        Self {
            user_id: data.user_id,
            role: data.role,
            branch_id: data.branch_id,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuthData>() {
            return Ok(auth.clone().into());
        }

        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let auth_data = UserAuthData::validate(&state.jwt, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(auth_data.into())
    }
}
