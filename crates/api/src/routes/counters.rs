//! Counter and counter session endpoint handlers.

use axum::extract::{Query, State};
use domain::models::{ActiveSession, CounterOverview, CounterSession, LastUsedCounter};
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::response::ApiResponse;
use crate::services::counter_session::StartedSession;
use crate::services::queue::require_id;
use crate::services::CounterSessionService;

/// Request body for opening a counter session.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub counter_id: Option<i64>,
    /// Close the caller's open session elsewhere instead of failing.
    #[serde(default)]
    pub end_existing: bool,
}

/// Request body for ending a session. Without an id the caller's own open
/// session is ended.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    pub session_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersQuery {
    pub branch_id: Option<i64>,
}

/// POST /api/counters/start-session
pub async fn start_session(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<StartSessionRequest>,
) -> Result<ApiResponse<StartedSession>, ApiError> {
    let counter_id = require_id("counterId", request.counter_id)?;
    let service = CounterSessionService::new(state.pool.clone());
    let started = service.start(&auth, counter_id, request.end_existing).await?;
    Ok(ApiResponse::created(started))
}

/// POST /api/counters/end-session
pub async fn end_session(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<EndSessionRequest>,
) -> Result<ApiResponse<CounterSession>, ApiError> {
    let service = CounterSessionService::new(state.pool.clone());
    let ended = service.end(&auth, request.session_id).await?;
    Ok(ApiResponse::ok(ended))
}

/// The caller's open session, or `null` data when none is open.
///
/// GET /api/counters/my-session
pub async fn my_session(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<ApiResponse<Option<ActiveSession>>, ApiError> {
    let service = CounterSessionService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.get_active(auth.user_id).await?))
}

/// GET /api/counters/last-used
pub async fn last_used(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<ApiResponse<Option<LastUsedCounter>>, ApiError> {
    let service = CounterSessionService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.get_last_used(&auth).await?))
}

/// Counters of a branch with occupancy. Clerks default to their own branch.
///
/// GET /api/counters?branchId=
pub async fn list_counters(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<CountersQuery>,
) -> Result<ApiResponse<Vec<CounterOverview>>, ApiError> {
    let branch_id = require_id("branchId", query.branch_id.or(auth.branch_id))?;
    let service = CounterSessionService::new(state.pool.clone());
    Ok(ApiResponse::ok(service.list_counters(branch_id).await?))
}
