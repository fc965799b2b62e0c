//! Queue ticket lifecycle service.
//!
//! Issues tickets and moves them through waiting -> called -> serving ->
//! completed. Every mutation propagates its failure to the caller.

use domain::models::{IssuedTicket, Ticket, TicketStatus};
use domain::services::estimate_wait_minutes;
use domain::QueueError;
use persistence::repositories::{CounterRepository, CounterSessionRepository, QueueRepository};
use sqlx::PgPool;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::metrics::{record_ticket_called, record_ticket_completed, record_ticket_issued};

/// Rejects a missing or non-positive id before any store access.
pub fn require_id(field: &str, id: Option<i64>) -> Result<i64, QueueError> {
    match id {
        None => Err(QueueError::validation(field, format!("{} is required", field))),
        Some(id) => require_positive(field, id),
    }
}

pub fn require_ticket_id(ticket_id: Option<i64>) -> Result<i64, QueueError> {
    require_id("ticketId", ticket_id)
}

pub(crate) fn require_positive(field: &str, id: i64) -> Result<i64, QueueError> {
    if id <= 0 {
        return Err(QueueError::validation(
            field,
            format!("{} must be a positive integer", field),
        ));
    }
    Ok(id)
}

pub struct QueueService {
    queue: QueueRepository,
    counters: CounterRepository,
    sessions: CounterSessionRepository,
    avg_service_time_minutes: f64,
}

impl QueueService {
    pub fn new(pool: PgPool, avg_service_time_minutes: f64) -> Self {
        Self {
            queue: QueueRepository::new(pool.clone()),
            counters: CounterRepository::new(pool.clone()),
            sessions: CounterSessionRepository::new(pool),
            avg_service_time_minutes,
        }
    }

    /// RequestTicket: always succeeds for an active branch, whatever the
    /// number of staffed counters.
    pub async fn request_ticket(&self, branch_id: i64) -> Result<IssuedTicket, ApiError> {
        require_positive("branchId", branch_id)?;

        let issued = self
            .queue
            .issue_ticket(branch_id)
            .await?
            .ok_or(QueueError::BranchNotFound)?;

        record_ticket_issued(branch_id);
        info!(
            branch_id,
            ticket_id = issued.ticket.id,
            number = issued.ticket.number,
            waiting_ahead = issued.waiting_ahead,
            "Ticket issued"
        );

        Ok(IssuedTicket {
            estimated_wait_minutes: estimate_wait_minutes(
                issued.waiting_ahead,
                self.avg_service_time_minutes,
                issued.active_counters,
            ),
            waiting_ahead: issued.waiting_ahead,
            ticket: issued.ticket.into(),
        })
    }

    /// CallNext: claims the oldest waiting ticket of the counter's branch.
    ///
    /// The caller must hold the counter's open session.
    pub async fn call_next(&self, user_id: i64, counter_id: i64) -> Result<Ticket, ApiError> {
        require_positive("counterId", counter_id)?;

        let counter = self
            .counters
            .find_by_id(counter_id)
            .await?
            .ok_or(QueueError::CounterNotFound)?;

        match self.sessions.find_open_for_counter(counter_id).await? {
            Some(session) if session.user_id == user_id => {}
            _ => return Err(QueueError::NoActiveSession.into()),
        }

        let ticket = self
            .queue
            .call_next(counter.branch_id, counter_id, user_id)
            .await?
            .ok_or(QueueError::NoWaitingTickets)?;

        record_ticket_called(counter.branch_id);
        info!(
            branch_id = counter.branch_id,
            counter_id,
            user_id,
            ticket_id = ticket.id,
            number = ticket.number,
            "Ticket called"
        );

        Ok(ticket.into())
    }

    /// Explicit called -> serving step.
    pub async fn start_serving(
        &self,
        user_id: i64,
        ticket_id: Option<i64>,
    ) -> Result<Ticket, ApiError> {
        let ticket_id = require_ticket_id(ticket_id)?;
        let counter_id = self
            .authorize_transition(user_id, ticket_id, TicketStatus::Serving)
            .await?;

        match self.queue.mark_serving(ticket_id, counter_id).await? {
            Some(ticket) => {
                info!(ticket_id, counter_id, user_id, "Ticket serving");
                Ok(ticket.into())
            }
            None => Err(self
                .classify_lost_race(ticket_id, counter_id, TicketStatus::Serving)
                .await
                .into()),
        }
    }

    /// CompleteService: called or serving -> completed at the caller's counter.
    pub async fn complete_service(
        &self,
        user_id: i64,
        ticket_id: Option<i64>,
    ) -> Result<Ticket, ApiError> {
        let ticket_id = require_ticket_id(ticket_id)?;
        let counter_id = self
            .authorize_transition(user_id, ticket_id, TicketStatus::Completed)
            .await?;

        match self
            .queue
            .mark_completed(ticket_id, counter_id, user_id)
            .await?
        {
            Some(ticket) => {
                record_ticket_completed(ticket.branch_id);
                info!(ticket_id, counter_id, user_id, "Ticket completed");
                Ok(ticket.into())
            }
            None => Err(self
                .classify_lost_race(ticket_id, counter_id, TicketStatus::Completed)
                .await
                .into()),
        }
    }

    /// Checks the ticket may move to `target` and that it is held by the
    /// counter of the caller's open session. Returns that counter id.
    async fn authorize_transition(
        &self,
        user_id: i64,
        ticket_id: i64,
        target: TicketStatus,
    ) -> Result<i64, ApiError> {
        let ticket = self
            .queue
            .find_by_id(ticket_id)
            .await?
            .ok_or(QueueError::TicketNotFound)?;

        TicketStatus::from(ticket.status).ensure_transition(target)?;

        let session = self
            .sessions
            .find_open_for_user(user_id)
            .await?
            .ok_or(QueueError::NoActiveSession)?;

        if ticket.counter_id != Some(session.counter_id) {
            return Err(QueueError::TicketNotAtCounter.into());
        }

        Ok(session.counter_id)
    }

    /// The conditional update matched nothing: someone else moved the
    /// ticket between the check and the write. Re-read to explain why.
    async fn classify_lost_race(
        &self,
        ticket_id: i64,
        counter_id: i64,
        target: TicketStatus,
    ) -> QueueError {
        let current = match self.queue.find_by_id(ticket_id).await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return QueueError::TicketNotFound,
            Err(e) => {
                tracing::warn!(ticket_id, error = %e, "Failed to re-read ticket");
                return QueueError::TicketNotFound;
            }
        };

        if let Err(err) = TicketStatus::from(current.status).ensure_transition(target) {
            return err;
        }
        if current.counter_id != Some(counter_id) {
            return QueueError::TicketNotAtCounter;
        }
        QueueError::InvalidTicketTransition {
            from: current.status.into(),
            to: target,
        }
    }
}
