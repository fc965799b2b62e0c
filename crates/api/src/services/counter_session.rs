//! Counter session service.
//!
//! Enforces one open session per counter and one per user, and exposes the
//! "resume where I left off" lookups.

use domain::models::{ActiveSession, CounterOverview, CounterSession, LastUsedCounter, Role};
use domain::QueueError;
use persistence::repositories::{
    BranchRepository, CounterRepository, CounterSessionRepository, QueueRepository,
    StartSessionOutcome,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::or_fallback;
use crate::services::queue::require_positive;

/// A newly opened session and the one it replaced, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    pub session: CounterSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_session_id: Option<i64>,
}

pub struct CounterSessionService {
    branches: BranchRepository,
    counters: CounterRepository,
    sessions: CounterSessionRepository,
    queue: QueueRepository,
}

impl CounterSessionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            branches: BranchRepository::new(pool.clone()),
            counters: CounterRepository::new(pool.clone()),
            sessions: CounterSessionRepository::new(pool.clone()),
            queue: QueueRepository::new(pool),
        }
    }

    /// StartSession: claims a counter for the caller.
    ///
    /// Clerks may only work counters of their own branch. With
    /// `end_existing` the caller's open session elsewhere is closed in the
    /// same transaction.
    pub async fn start(
        &self,
        auth: &UserAuth,
        counter_id: i64,
        end_existing: bool,
    ) -> Result<StartedSession, ApiError> {
        require_positive("counterId", counter_id)?;

        let counter = self
            .counters
            .find_by_id(counter_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or(QueueError::CounterNotFound)?;

        if self.branches.find_active(counter.branch_id).await?.is_none() {
            return Err(QueueError::BranchNotFound.into());
        }

        if auth.role == Role::Clerk && auth.branch_id != Some(counter.branch_id) {
            return Err(QueueError::BranchMismatch.into());
        }

        match self
            .sessions
            .start_session(auth.user_id, counter_id, end_existing)
            .await?
        {
            StartSessionOutcome::Started {
                session,
                ended_previous,
            } => {
                info!(
                    user_id = auth.user_id,
                    counter_id,
                    session_id = session.id,
                    ended_previous = ?ended_previous,
                    "Counter session started"
                );
                Ok(StartedSession {
                    session: session.into(),
                    ended_session_id: ended_previous,
                })
            }
            StartSessionOutcome::CounterNotFound => Err(QueueError::CounterNotFound.into()),
            StartSessionOutcome::CounterOccupied => Err(QueueError::CounterOccupied.into()),
            StartSessionOutcome::UserHasActiveSession => {
                Err(QueueError::UserHasActiveSession.into())
            }
        }
    }

    /// EndSession: closes a session. Tickets already called at the counter
    /// stay attached to it.
    ///
    /// Without a session id the caller's open session is ended.
    pub async fn end(
        &self,
        auth: &UserAuth,
        session_id: Option<i64>,
    ) -> Result<CounterSession, ApiError> {
        let session_id = match session_id {
            Some(id) => require_positive("sessionId", id)?,
            None => self
                .sessions
                .find_open_for_user(auth.user_id)
                .await?
                .map(|s| s.id)
                .ok_or(QueueError::NoActiveSession)?,
        };

        let existing = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(QueueError::SessionNotFound)?;

        if existing.user_id != auth.user_id && !auth.is_admin() {
            return Err(ApiError::Forbidden(
                "Cannot end another user's counter session".to_string(),
            ));
        }

        if existing.end_time.is_some() {
            return Err(QueueError::SessionAlreadyEnded.into());
        }

        let ended = self
            .sessions
            .end_session(session_id)
            .await?
            .ok_or(QueueError::SessionAlreadyEnded)?;

        info!(
            user_id = ended.user_id,
            ended_by = auth.user_id,
            counter_id = ended.counter_id,
            session_id,
            "Counter session ended"
        );

        Ok(ended.into())
    }

    /// GetActiveSession: the caller's open session with the ticket currently
    /// claimed at that counter.
    ///
    /// A failed session read answers "no session"; a failed ticket read keeps
    /// the session and reports no current ticket.
    pub async fn get_active(&self, user_id: i64) -> Result<Option<ActiveSession>, ApiError> {
        let open = or_fallback(
            "open_session_for_user",
            self.sessions.find_open_for_user(user_id).await,
            None,
        );
        let Some(open) = open else {
            return Ok(None);
        };

        let current_ticket = or_fallback(
            "in_progress_ticket_for_counter",
            self.queue.find_in_progress_for_counter(open.counter_id).await,
            None,
        )
        .map(Into::into);

        Ok(Some(ActiveSession {
            session: open.session(),
            branch_id: open.branch_id,
            counter_number: open.counter_number,
            current_ticket,
        }))
    }

    /// GetLastUsedCounter: absence is a normal outcome, not an error. Read
    /// failures are reported as absence too.
    pub async fn get_last_used(
        &self,
        auth: &UserAuth,
    ) -> Result<Option<LastUsedCounter>, ApiError> {
        let open = or_fallback(
            "open_session_for_user",
            self.sessions.find_open_for_user(auth.user_id).await,
            None,
        );
        if open.is_some() {
            return Ok(None);
        }

        Ok(or_fallback(
            "last_used_counter",
            self.sessions
                .find_last_used_counter(auth.user_id, auth.branch_id)
                .await,
            None,
        )
        .map(Into::into))
    }

    /// Counters of a branch with their occupancy, for the counter picker.
    pub async fn list_counters(&self, branch_id: i64) -> Result<Vec<CounterOverview>, ApiError> {
        require_positive("branchId", branch_id)?;

        if self.branches.find_active(branch_id).await?.is_none() {
            return Err(QueueError::BranchNotFound.into());
        }

        let counters = self.counters.list_with_occupancy(branch_id, false).await?;
        Ok(counters.into_iter().map(Into::into).collect())
    }
}
