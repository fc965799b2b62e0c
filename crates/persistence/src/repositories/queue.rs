//! Queue ticket repository for database operations.
//!
//! Every state change is a conditional UPDATE on the expected current status,
//! so concurrent callers cannot move the same ticket twice.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::entities::{
    BranchCountsEntity, CalledTicketEntity, CompletedTicketEntity, ServedTicketEntity,
    TicketEntity, WaitingTicketEntity,
};
use crate::metrics::QueryTimer;

/// A freshly issued ticket with the queue state it was issued into.
#[derive(Debug, Clone)]
pub struct IssuedTicketRow {
    pub ticket: TicketEntity,
    pub waiting_ahead: i64,
    pub active_counters: i64,
}

/// Repository for queue ticket database operations.
#[derive(Clone)]
pub struct QueueRepository {
    pool: PgPool,
}

impl QueueRepository {
    /// Creates a new QueueRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue the next ticket number for an active branch.
    ///
    /// The branch row is locked for the duration of the transaction so two
    /// concurrent requests never compute the same number. Numbers restart at 1
    /// on each `queue_date`. Returns None when the branch is missing or inactive.
    pub async fn issue_ticket(
        &self,
        branch_id: i64,
    ) -> Result<Option<IssuedTicketRow>, sqlx::Error> {
        let timer = QueryTimer::new("issue_ticket");
        let result = self.issue_ticket_tx(branch_id).await;
        timer.record();
        result
    }

    async fn issue_ticket_tx(
        &self,
        branch_id: i64,
    ) -> Result<Option<IssuedTicketRow>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let branch: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM branches WHERE id = $1 AND is_active = true FOR UPDATE",
        )
        .bind(branch_id)
        .fetch_optional(&mut *tx)
        .await?;
        if branch.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let ticket = sqlx::query_as::<_, TicketEntity>(
            r#"
            INSERT INTO queue (branch_id, queue_date, number)
            SELECT $1, CURRENT_DATE, COALESCE(MAX(number), 0) + 1
            FROM queue
            WHERE branch_id = $1 AND queue_date = CURRENT_DATE
            RETURNING id, branch_id, queue_date, number, status, counter_id, served_by,
                      created_at, called_at, serving_at, completed_at
            "#,
        )
        .bind(branch_id)
        .fetch_one(&mut *tx)
        .await?;

        let waiting_ahead: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM queue
            WHERE branch_id = $1 AND queue_date = CURRENT_DATE
              AND status = 'waiting' AND id <> $2
            "#,
        )
        .bind(branch_id)
        .bind(ticket.id)
        .fetch_one(&mut *tx)
        .await?;

        let active_counters: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT cs.counter_id)
            FROM counter_sessions cs
            JOIN counters c ON c.id = cs.counter_id
            WHERE c.branch_id = $1 AND cs.end_time IS NULL
            "#,
        )
        .bind(branch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(IssuedTicketRow {
            ticket,
            waiting_ahead,
            active_counters,
        }))
    }

    /// Claim the oldest waiting ticket of a branch for a counter.
    ///
    /// FIFO by creation time, ties broken by number. Only today's queue is
    /// callable; waiting tickets left over from an earlier `queue_date` are
    /// never handed out again. Rows locked by a concurrent claim are skipped,
    /// so each ticket is claimed exactly once.
    pub async fn call_next(
        &self,
        branch_id: i64,
        counter_id: i64,
        user_id: i64,
    ) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("call_next_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(
            r#"
            UPDATE queue
            SET status = 'called', counter_id = $2, served_by = $3, called_at = NOW()
            WHERE id = (
                SELECT id FROM queue
                WHERE branch_id = $1 AND queue_date = CURRENT_DATE AND status = 'waiting'
                ORDER BY created_at, number, id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            AND status = 'waiting'
            RETURNING id, branch_id, queue_date, number, status, counter_id, served_by,
                      created_at, called_at, serving_at, completed_at
            "#,
        )
        .bind(branch_id)
        .bind(counter_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ticket_by_id");
        let result = sqlx::query_as::<_, TicketEntity>(
            r#"
            SELECT id, branch_id, queue_date, number, status, counter_id, served_by,
                   created_at, called_at, serving_at, completed_at
            FROM queue
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// called -> serving, only for the counter holding the ticket.
    pub async fn mark_serving(
        &self,
        ticket_id: i64,
        counter_id: i64,
    ) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_ticket_serving");
        let result = sqlx::query_as::<_, TicketEntity>(
            r#"
            UPDATE queue
            SET status = 'serving', serving_at = NOW()
            WHERE id = $1 AND counter_id = $2 AND status = 'called'
            RETURNING id, branch_id, queue_date, number, status, counter_id, served_by,
                      created_at, called_at, serving_at, completed_at
            "#,
        )
        .bind(ticket_id)
        .bind(counter_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// called|serving -> completed, only for the counter holding the ticket.
    pub async fn mark_completed(
        &self,
        ticket_id: i64,
        counter_id: i64,
        user_id: i64,
    ) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_ticket_completed");
        let result = sqlx::query_as::<_, TicketEntity>(
            r#"
            UPDATE queue
            SET status = 'completed', completed_at = NOW(), served_by = $3
            WHERE id = $1 AND counter_id = $2 AND status IN ('called', 'serving')
            RETURNING id, branch_id, queue_date, number, status, counter_id, served_by,
                      created_at, called_at, serving_at, completed_at
            "#,
        )
        .bind(ticket_id)
        .bind(counter_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ticket currently claimed at a counter (called or serving), if any.
    pub async fn find_in_progress_for_counter(
        &self,
        counter_id: i64,
    ) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_in_progress_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(
            r#"
            SELECT id, branch_id, queue_date, number, status, counter_id, served_by,
                   created_at, called_at, serving_at, completed_at
            FROM queue
            WHERE counter_id = $1 AND status IN ('called', 'serving')
            ORDER BY called_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(counter_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Waiting (today's queue only), in-progress, completed-today and
    /// active-counter counts.
    pub async fn branch_counts(&self, branch_id: i64) -> Result<BranchCountsEntity, sqlx::Error> {
        let timer = QueryTimer::new("branch_counts");
        let result = sqlx::query_as::<_, BranchCountsEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM queue
                 WHERE branch_id = $1 AND queue_date = CURRENT_DATE
                   AND status = 'waiting') AS waiting_count,
                (SELECT COUNT(*) FROM queue
                 WHERE branch_id = $1 AND status IN ('called', 'serving')) AS serving_count,
                (SELECT COUNT(*) FROM queue
                 WHERE branch_id = $1 AND status = 'completed'
                   AND completed_at >= CURRENT_DATE) AS completed_today,
                (SELECT COUNT(DISTINCT cs.counter_id)
                 FROM counter_sessions cs
                 JOIN counters c ON c.id = cs.counter_id
                 WHERE c.branch_id = $1 AND cs.end_time IS NULL) AS active_counters
            "#,
        )
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recently called ticket of the branch with its counter number.
    pub async fn last_called(
        &self,
        branch_id: i64,
    ) -> Result<Option<CalledTicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("last_called_ticket");
        let result = sqlx::query_as::<_, CalledTicketEntity>(
            r#"
            SELECT q.id AS ticket_id, q.number, q.status, q.counter_id,
                   c.number AS counter_number, q.called_at
            FROM queue q
            JOIN counters c ON c.id = q.counter_id
            WHERE q.branch_id = $1 AND q.called_at IS NOT NULL
            ORDER BY q.called_at DESC, q.id DESC
            LIMIT 1
            "#,
        )
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn now_serving(
        &self,
        branch_id: i64,
    ) -> Result<Vec<CalledTicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("now_serving_tickets");
        let result = sqlx::query_as::<_, CalledTicketEntity>(
            r#"
            SELECT q.id AS ticket_id, q.number, q.status, q.counter_id,
                   c.number AS counter_number, q.called_at
            FROM queue q
            JOIN counters c ON c.id = q.counter_id
            WHERE q.branch_id = $1 AND q.status IN ('called', 'serving')
            ORDER BY q.called_at DESC, q.id DESC
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Today's waiting tickets, oldest first.
    pub async fn waiting_list(
        &self,
        branch_id: i64,
        limit: i64,
    ) -> Result<Vec<WaitingTicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("waiting_tickets");
        let result = sqlx::query_as::<_, WaitingTicketEntity>(
            r#"
            SELECT id AS ticket_id, number, created_at
            FROM queue
            WHERE branch_id = $1 AND queue_date = CURRENT_DATE AND status = 'waiting'
            ORDER BY created_at, number, id
            LIMIT $2
            "#,
        )
        .bind(branch_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Tickets completed today, newest first.
    pub async fn recently_completed(
        &self,
        branch_id: i64,
        limit: i64,
    ) -> Result<Vec<CompletedTicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recently_completed_tickets");
        let result = sqlx::query_as::<_, CompletedTicketEntity>(
            r#"
            SELECT q.id AS ticket_id, q.number, q.counter_id,
                   c.number AS counter_number, q.completed_at
            FROM queue q
            LEFT JOIN counters c ON c.id = q.counter_id
            WHERE q.branch_id = $1 AND q.status = 'completed'
              AND q.completed_at >= CURRENT_DATE
            ORDER BY q.completed_at DESC, q.id DESC
            LIMIT $2
            "#,
        )
        .bind(branch_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The database's current date, the same day `queue_date` defaults to.
    pub async fn current_date(&self) -> Result<NaiveDate, sqlx::Error> {
        let timer = QueryTimer::new("current_date");
        let result = sqlx::query_scalar::<_, NaiveDate>("SELECT CURRENT_DATE")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Tickets a staff member completed on the given date, in completion order.
    pub async fn served_by_user_on(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<ServedTicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("served_tickets_for_user");
        let result = sqlx::query_as::<_, ServedTicketEntity>(
            r#"
            SELECT q.id AS ticket_id, q.number, q.branch_id, q.counter_id,
                   c.number AS counter_number, q.called_at, q.completed_at,
                   EXTRACT(EPOCH FROM (q.completed_at - q.called_at))::BIGINT AS service_seconds
            FROM queue q
            JOIN counters c ON c.id = q.counter_id
            WHERE q.served_by = $1 AND q.status = 'completed'
              AND q.completed_at >= $2::DATE
              AND q.completed_at < ($2::DATE + 1)
            ORDER BY q.completed_at, q.id
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Hard delete for corrections. Returns false when the ticket does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_ticket");
        let result = sqlx::query("DELETE FROM queue WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
