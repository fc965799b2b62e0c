//! Admin endpoint handlers (`/api/admin/*`).
//!
//! All routes here sit behind `require_user_auth` and `require_admin`.

use axum::extract::{Path, Query, State};
use domain::models::{Branch, Counter, CounterOverview, CounterSession, Role, StaffUser};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::response::ApiResponse;
use crate::routes::queue::parse_path_id;
use crate::services::admin::NewStaffUser;
use crate::services::queue::require_id;
use crate::services::AdminService;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCounterRequest {
    pub branch_id: Option<i64>,

    #[validate(custom(function = "shared::validation::validate_counter_number"))]
    pub number: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    pub role: Role,

    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub role: Role,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
    pub user_id: i64,
    pub password_reset: bool,
}

// Branches

/// POST /api/admin/branches
pub async fn create_branch(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBranchRequest>,
) -> Result<ApiResponse<Branch>, ApiError> {
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::created(service.create_branch(&request.name).await?))
}

/// GET /api/admin/branches
pub async fn list_branches(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Branch>>, ApiError> {
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.list_branches(true).await?))
}

/// PUT /api/admin/branches/:id/active
pub async fn set_branch_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetActiveRequest>,
) -> Result<ApiResponse<Branch>, ApiError> {
    let id = parse_path_id("branchId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(
        service.set_branch_active(id, request.is_active).await?,
    ))
}

/// Every counter of a branch, inactive ones included.
///
/// GET /api/admin/branches/:id/counters
pub async fn list_branch_counters(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<CounterOverview>>, ApiError> {
    let id = parse_path_id("branchId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.list_counters(id).await?))
}

// Counters

/// POST /api/admin/counters
pub async fn create_counter(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCounterRequest>,
) -> Result<ApiResponse<Counter>, ApiError> {
    let branch_id = require_id("branchId", request.branch_id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::created(
        service.create_counter(branch_id, request.number).await?,
    ))
}

/// PUT /api/admin/counters/:id/active
pub async fn set_counter_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetActiveRequest>,
) -> Result<ApiResponse<Counter>, ApiError> {
    let id = parse_path_id("counterId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(
        service.set_counter_active(id, request.is_active).await?,
    ))
}

// Users

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<ApiResponse<StaffUser>, ApiError> {
    let service = AdminService::new(state.pool.clone());
    let user = service
        .create_user(NewStaffUser {
            username: request.username,
            password: request.password,
            full_name: request.full_name,
            role: request.role,
            branch_id: request.branch_id,
        })
        .await?;
    Ok(ApiResponse::created(user))
}

/// GET /api/admin/users?branchId=
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<ApiResponse<Vec<StaffUser>>, ApiError> {
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.list_users(query.branch_id).await?))
}

/// PUT /api/admin/users/:id/active
pub async fn set_user_active(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetActiveRequest>,
) -> Result<ApiResponse<StaffUser>, ApiError> {
    let id = parse_path_id("userId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(
        service
            .set_user_active(auth.user_id, id, request.is_active)
            .await?,
    ))
}

/// PUT /api/admin/users/:id/password
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<ApiResponse<PasswordResetResponse>, ApiError> {
    let id = parse_path_id("userId", &id)?;
    let service = AdminService::new(state.pool.clone());
    service.reset_password(id, &request.password).await?;
    Ok(ApiResponse::ok(PasswordResetResponse {
        user_id: id,
        password_reset: true,
    }))
}

/// PUT /api/admin/users/:id/assignment
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateAssignmentRequest>,
) -> Result<ApiResponse<StaffUser>, ApiError> {
    let id = parse_path_id("userId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(
        service
            .update_assignment(id, request.role, request.branch_id)
            .await?,
    ))
}

// Corrections

/// DELETE /api/admin/tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedResponse>, ApiError> {
    let id = parse_path_id("ticketId", &id)?;
    let service = AdminService::new(state.pool.clone());
    service.delete_ticket(id).await?;
    Ok(ApiResponse::ok(DeletedResponse { deleted: true, id }))
}

/// POST /api/admin/sessions/:id/end
pub async fn force_end_session(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<CounterSession>, ApiError> {
    let id = parse_path_id("sessionId", &id)?;
    let service = AdminService::new(state.pool.clone());
    Ok(ApiResponse::ok(
        service.force_end_session(auth.user_id, id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_request(username: &str, role: Role) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: "counter-pass".to_string(),
            full_name: "Anna Clerk".to_string(),
            role,
            branch_id: Some(1),
        }
    }

    #[test]
    fn test_create_user_request_validation() {
        assert!(user_request("anna.k", Role::Clerk).validate().is_ok());
    }

    #[test]
    fn test_create_user_request_bad_username() {
        assert!(user_request("a", Role::Clerk).validate().is_err());
        assert!(user_request("anna k", Role::Clerk).validate().is_err());
    }

    #[test]
    fn test_create_user_request_role_parsing() {
        let request: CreateUserRequest = serde_json::from_str(
            r#"{"username":"boss","password":"admin-pass","fullName":"Boss","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(request.role, Role::Admin);
        assert!(request.branch_id.is_none());

        let bad = serde_json::from_str::<CreateUserRequest>(
            r#"{"username":"boss","password":"admin-pass","fullName":"Boss","role":"owner"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_create_counter_request_number_range() {
        let ok = CreateCounterRequest {
            branch_id: Some(1),
            number: 3,
        };
        assert!(ok.validate().is_ok());

        let zero = CreateCounterRequest {
            branch_id: Some(1),
            number: 0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_create_branch_request_name_length() {
        let empty = CreateBranchRequest {
            name: String::new(),
        };
        assert!(empty.validate().is_err());
        let long = CreateBranchRequest {
            name: "B".repeat(101),
        };
        assert!(long.validate().is_err());
    }
}
