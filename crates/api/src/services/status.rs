//! Status aggregator: read-only snapshots for the customer, clerk and
//! display views.
//!
//! Reads never fail the request once the input is valid. A failing query is
//! logged and replaced with an empty value so polling clients always get a
//! well-formed snapshot.

use chrono::{NaiveDate, Utc};
use domain::models::{BranchStatusSnapshot, DisplaySnapshot, WorkHistory};
use domain::services::{estimate_wait_minutes, summarize};
use domain::QueueError;
use persistence::entities::BranchCountsEntity;
use persistence::repositories::{BranchRepository, QueueRepository};
use sqlx::PgPool;
use tracing::warn;

use crate::config::QueueConfig;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_aggregator_fallback;
use crate::services::or_fallback;
use crate::services::queue::require_positive;

/// Waiting tickets listed on the display board.
const DISPLAY_WAITING_LIMIT: i64 = 50;

pub struct StatusAggregator {
    branches: BranchRepository,
    queue: QueueRepository,
    avg_service_time_minutes: f64,
    recent_completed_limit: i64,
}

impl StatusAggregator {
    pub fn new(pool: PgPool, config: &QueueConfig) -> Self {
        Self {
            branches: BranchRepository::new(pool.clone()),
            queue: QueueRepository::new(pool),
            avg_service_time_minutes: config.avg_service_time_minutes,
            recent_completed_limit: config.recent_completed_limit,
        }
    }

    /// A branch id that is positive but unknown yields `branch_not_found`.
    /// If the lookup itself fails the branch is assumed to exist.
    async fn ensure_branch(&self, branch_id: i64) -> Result<(), ApiError> {
        require_positive("branchId", branch_id)?;

        match self.branches.find_active(branch_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(QueueError::BranchNotFound.into()),
            Err(e) => {
                warn!(branch_id, error = %e, "Branch lookup failed");
                record_aggregator_fallback("branch_lookup");
                Ok(())
            }
        }
    }

    pub async fn branch_status(&self, branch_id: i64) -> Result<BranchStatusSnapshot, ApiError> {
        self.ensure_branch(branch_id).await?;

        let counts = or_fallback(
            "branch_counts",
            self.queue.branch_counts(branch_id).await,
            BranchCountsEntity::default(),
        );
        let last_called = or_fallback("last_called", self.queue.last_called(branch_id).await, None);

        Ok(BranchStatusSnapshot {
            branch_id,
            waiting_count: counts.waiting_count,
            serving_count: counts.serving_count,
            active_counters: counts.active_counters,
            completed_today: counts.completed_today,
            last_called: last_called.map(Into::into),
            estimated_wait_minutes: estimate_wait_minutes(
                counts.waiting_count,
                self.avg_service_time_minutes,
                counts.active_counters,
            ),
            can_take_number: true,
        })
    }

    pub async fn display(&self, branch_id: i64) -> Result<DisplaySnapshot, ApiError> {
        self.ensure_branch(branch_id).await?;

        let counts = or_fallback(
            "branch_counts",
            self.queue.branch_counts(branch_id).await,
            BranchCountsEntity::default(),
        );
        let now_serving = or_fallback("now_serving", self.queue.now_serving(branch_id).await, vec![]);
        let waiting = or_fallback(
            "waiting_list",
            self.queue
                .waiting_list(branch_id, DISPLAY_WAITING_LIMIT)
                .await,
            vec![],
        );
        let recently_completed = or_fallback(
            "recently_completed",
            self.queue
                .recently_completed(branch_id, self.recent_completed_limit)
                .await,
            vec![],
        );

        Ok(DisplaySnapshot {
            branch_id,
            now_serving: now_serving.into_iter().map(Into::into).collect(),
            waiting: waiting.into_iter().map(Into::into).collect(),
            recently_completed: recently_completed.into_iter().map(Into::into).collect(),
            waiting_count: counts.waiting_count,
            active_counters: counts.active_counters,
            completed_today: counts.completed_today,
        })
    }

    /// Completed tickets a staff member served on `date`, with statistics.
    ///
    /// Without a date the database's current date is used, so "today" is the
    /// same day tickets are numbered under. Clerks may only read their own
    /// history.
    pub async fn history(
        &self,
        auth: &UserAuth,
        user_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<WorkHistory, ApiError> {
        require_positive("userId", user_id)?;

        if !auth.is_admin() && auth.user_id != user_id {
            return Err(ApiError::Forbidden(
                "Clerks may only view their own history".to_string(),
            ));
        }

        let date = match date {
            Some(date) => date,
            None => or_fallback(
                "current_date",
                self.queue.current_date().await,
                Utc::now().date_naive(),
            ),
        };

        let tickets = or_fallback(
            "served_by_user",
            self.queue.served_by_user_on(user_id, date).await,
            vec![],
        );
        if tickets.is_empty() {
            return Ok(WorkHistory::empty(user_id, date));
        }

        let tickets: Vec<_> = tickets.into_iter().map(Into::into).collect();
        let stats = summarize(&tickets);

        Ok(WorkHistory {
            user_id,
            date,
            tickets,
            stats,
        })
    }
}
