//! Authentication service for staff login, logout and profile lookup.

use domain::models::StaffUser;
use persistence::repositories::{CounterSessionRepository, UserRepository};
use serde::Serialize;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is disabled")]
    UserDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UserDisabled => ApiError::UserDisabled,
            AuthError::UserNotFound => ApiError::Domain(domain::QueueError::UserNotFound),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub expires_in: i64,
    pub user: StaffUser,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    sessions: CounterSessionRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: CounterSessionRepository::new(pool),
            jwt,
        }
    }

    /// Verifies credentials and issues an access token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable. The
    /// disabled check only runs once the password has been verified.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let user: StaffUser = user.into();
        let issued =
            self.jwt
                .generate_access_token(user.id, user.role.as_str(), user.branch_id)?;

        if let Err(e) = self.users.record_login(user.id).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to record login time");
        }

        info!(user_id = user.id, role = %user.role, jti = %issued.jti, "Staff login");

        Ok(LoginResult {
            token: issued.token,
            expires_in: issued.expires_in,
            user,
        })
    }

    /// Ends the caller's open counter session, if any.
    ///
    /// Tokens are stateless; the client discards its copy.
    pub async fn logout(&self, user_id: i64) -> Result<bool, AuthError> {
        let ended = self.sessions.end_open_for_user(user_id).await?;
        if let Some(session) = &ended {
            info!(
                user_id,
                session_id = session.id,
                counter_id = session.counter_id,
                "Counter session ended on logout"
            );
        }
        Ok(ended.is_some())
    }

    /// Returns the caller's profile.
    pub async fn me(&self, user_id: i64) -> Result<StaffUser, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_invalid_credentials_maps_to_401() {
        let api: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(api.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_disabled_user_maps_to_401() {
        let api: ApiError = AuthError::UserDisabled.into();
        assert!(matches!(api, ApiError::UserDisabled));
    }

    #[test]
    fn test_missing_user_maps_to_not_found() {
        let api: ApiError = AuthError::UserNotFound.into();
        assert_eq!(api.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_token_error_is_internal() {
        let api: ApiError = AuthError::TokenError(JwtError::InvalidToken).into();
        assert_eq!(api.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_login_result_serialization() {
        let result = LoginResult {
            token: "abc".to_string(),
            expires_in: 28800,
            user: StaffUser {
                id: 4,
                username: "clerk1".to_string(),
                full_name: "Clerk One".to_string(),
                role: domain::models::Role::Clerk,
                branch_id: Some(1),
                is_active: true,
                created_at: chrono::Utc::now(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["expiresIn"], 28800);
        assert_eq!(json["user"]["fullName"], "Clerk One");
        assert_eq!(json["user"]["branchId"], 1);
        assert_eq!(json["user"]["role"], "clerk");
    }
}
