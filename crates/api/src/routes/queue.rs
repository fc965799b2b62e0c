//! Queue endpoint handlers.
//!
//! Ticket issuance, status and display are public; calling, serving and
//! completing require an authenticated staff member.

use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use domain::models::{BranchStatusSnapshot, DisplaySnapshot, IssuedTicket, Ticket, WorkHistory};
use domain::QueueError;
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::response::ApiResponse;
use crate::services::queue::require_id;
use crate::services::{QueueService, StatusAggregator};

/// Request body for taking a number.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberRequest {
    pub branch_id: Option<i64>,
}

/// Request body for calling the next customer to a counter.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CallNextRequest {
    pub counter_id: Option<i64>,
}

/// Request body for serve and complete. A null or missing id is rejected
/// before any store access.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TicketActionRequest {
    pub ticket_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// `YYYY-MM-DD`, defaults to the database's current date.
    pub date: Option<String>,
}

/// Parses a numeric path segment into a positive id.
pub(crate) fn parse_path_id(field: &str, raw: &str) -> Result<i64, QueueError> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| QueueError::validation(field, format!("{} must be a positive integer", field)))?;
    require_id(field, Some(id))
}

/// None when the date is absent; the aggregator then asks the database.
fn parse_history_date(raw: Option<&str>) -> Result<Option<NaiveDate>, QueueError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| QueueError::validation("date", "date must be formatted YYYY-MM-DD"))
        })
        .transpose()
}

/// Take a number.
///
/// POST /api/queue/next-number
pub async fn next_number(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<NextNumberRequest>,
) -> Result<ApiResponse<IssuedTicket>, ApiError> {
    let branch_id = require_id("branchId", request.branch_id)?;
    let service = QueueService::new(state.pool.clone(), state.config.queue.avg_service_time_minutes);
    let ticket = service.request_ticket(branch_id).await?;
    Ok(ApiResponse::created(ticket))
}

/// Call the oldest waiting ticket to the caller's counter.
///
/// POST /api/queue/call-next
pub async fn call_next(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<CallNextRequest>,
) -> Result<ApiResponse<Ticket>, ApiError> {
    let counter_id = require_id("counterId", request.counter_id)?;
    let service = QueueService::new(state.pool.clone(), state.config.queue.avg_service_time_minutes);
    let ticket = service.call_next(auth.user_id, counter_id).await?;
    Ok(ApiResponse::ok(ticket))
}

/// Mark a called ticket as being served.
///
/// POST /api/queue/serve
pub async fn serve(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<TicketActionRequest>,
) -> Result<ApiResponse<Ticket>, ApiError> {
    let service = QueueService::new(state.pool.clone(), state.config.queue.avg_service_time_minutes);
    let ticket = service.start_serving(auth.user_id, request.ticket_id).await?;
    Ok(ApiResponse::ok(ticket))
}

/// Complete a called or serving ticket.
///
/// POST /api/queue/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<TicketActionRequest>,
) -> Result<ApiResponse<Ticket>, ApiError> {
    let service = QueueService::new(state.pool.clone(), state.config.queue.avg_service_time_minutes);
    let ticket = service.complete_service(auth.user_id, request.ticket_id).await?;
    Ok(ApiResponse::ok(ticket))
}

/// Branch status snapshot.
///
/// GET /api/queue/status/:branch_id
pub async fn branch_status(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> Result<ApiResponse<BranchStatusSnapshot>, ApiError> {
    let branch_id = parse_path_id("branchId", &branch_id)?;
    let aggregator = StatusAggregator::new(state.pool.clone(), &state.config.queue);
    Ok(ApiResponse::ok(aggregator.branch_status(branch_id).await?))
}

/// Display board snapshot.
///
/// GET /api/queue/display/:branch_id
pub async fn display(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> Result<ApiResponse<DisplaySnapshot>, ApiError> {
    let branch_id = parse_path_id("branchId", &branch_id)?;
    let aggregator = StatusAggregator::new(state.pool.clone(), &state.config.queue);
    Ok(ApiResponse::ok(aggregator.display(branch_id).await?))
}

/// A staff member's completed tickets for one day.
///
/// GET /api/queue/history/:user_id?date=YYYY-MM-DD
pub async fn history(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<ApiResponse<WorkHistory>, ApiError> {
    let user_id = parse_path_id("userId", &user_id)?;
    let date = parse_history_date(query.date.as_deref())?;
    let aggregator = StatusAggregator::new(state.pool.clone(), &state.config.queue);
    Ok(ApiResponse::ok(aggregator.history(&auth, user_id, date).await?))
}
