//! Public branch listing for the customer tablet branch picker.

use axum::extract::State;
use domain::models::Branch;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

/// Active branches only.
///
/// GET /api/branches
pub async fn list_branches(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Branch>>, ApiError> {
    let repo = persistence::repositories::BranchRepository::new(state.pool.clone());
    let branches = repo.list(false).await?;
    Ok(ApiResponse::ok(branches.into_iter().map(Into::into).collect()))
}
