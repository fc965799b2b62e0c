//! Counter session repository for database operations.
//!
//! Open sessions are guarded twice: the start transaction locks the user and
//! counter rows before checking, and the partial unique indexes
//! `counter_sessions_open_counter_idx` / `counter_sessions_open_user_idx`
//! reject anything that slips through.

use sqlx::PgPool;

use crate::entities::{CounterSessionEntity, LastUsedCounterEntity, OpenSessionEntity};
use crate::metrics::QueryTimer;

const OPEN_COUNTER_INDEX: &str = "counter_sessions_open_counter_idx";
const OPEN_USER_INDEX: &str = "counter_sessions_open_user_idx";

/// Result of an attempt to open a counter session.
#[derive(Debug, Clone)]
pub enum StartSessionOutcome {
    Started {
        session: CounterSessionEntity,
        /// Session closed in the same transaction because `end_existing` was set.
        ended_previous: Option<i64>,
    },
    CounterNotFound,
    CounterOccupied,
    UserHasActiveSession,
}

/// Repository for counter session database operations.
#[derive(Clone)]
pub struct CounterSessionRepository {
    pool: PgPool,
}

impl CounterSessionRepository {
    /// Creates a new CounterSessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a session for `user_id` at `counter_id`.
    ///
    /// The user's own open session is checked before the counter's, so a
    /// repeated start at the same counter reports `UserHasActiveSession`.
    /// With `end_existing` the caller's open session is closed first instead.
    pub async fn start_session(
        &self,
        user_id: i64,
        counter_id: i64,
        end_existing: bool,
    ) -> Result<StartSessionOutcome, sqlx::Error> {
        let timer = QueryTimer::new("start_counter_session");
        let result = self.start_session_tx(user_id, counter_id, end_existing).await;
        timer.record();

        match result {
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                match db_err.constraint() {
                    Some(OPEN_COUNTER_INDEX) => Ok(StartSessionOutcome::CounterOccupied),
                    Some(OPEN_USER_INDEX) => Ok(StartSessionOutcome::UserHasActiveSession),
                    _ => Err(sqlx::Error::Database(db_err)),
                }
            }
            other => other,
        }
    }

    async fn start_session_tx(
        &self,
        user_id: i64,
        counter_id: i64,
        end_existing: bool,
    ) -> Result<StartSessionOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Lock order: user, then counter. Every writer follows it.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let counter: Option<i64> =
            sqlx::query_scalar("SELECT id FROM counters WHERE id = $1 FOR UPDATE")
                .bind(counter_id)
                .fetch_optional(&mut *tx)
                .await?;
        if counter.is_none() {
            tx.rollback().await?;
            return Ok(StartSessionOutcome::CounterNotFound);
        }

        let own_open: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM counter_sessions WHERE user_id = $1 AND end_time IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut ended_previous = None;
        if let Some(open_id) = own_open {
            if !end_existing {
                tx.rollback().await?;
                return Ok(StartSessionOutcome::UserHasActiveSession);
            }
            sqlx::query("UPDATE counter_sessions SET end_time = NOW() WHERE id = $1")
                .bind(open_id)
                .execute(&mut *tx)
                .await?;
            ended_previous = Some(open_id);
        }

        let occupied: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM counter_sessions
                WHERE counter_id = $1 AND end_time IS NULL
            )
            "#,
        )
        .bind(counter_id)
        .fetch_one(&mut *tx)
        .await?;
        if occupied {
            tx.rollback().await?;
            return Ok(StartSessionOutcome::CounterOccupied);
        }

        let session = sqlx::query_as::<_, CounterSessionEntity>(
            r#"
            INSERT INTO counter_sessions (counter_id, user_id)
            VALUES ($1, $2)
            RETURNING id, counter_id, user_id, start_time, end_time
            "#,
        )
        .bind(counter_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StartSessionOutcome::Started {
            session,
            ended_previous,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CounterSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_counter_session_by_id");
        let result = sqlx::query_as::<_, CounterSessionEntity>(
            r#"
            SELECT id, counter_id, user_id, start_time, end_time
            FROM counter_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Close an open session. Returns None when it is missing or already closed.
    pub async fn end_session(&self, id: i64) -> Result<Option<CounterSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("end_counter_session");
        let result = sqlx::query_as::<_, CounterSessionEntity>(
            r#"
            UPDATE counter_sessions
            SET end_time = NOW()
            WHERE id = $1 AND end_time IS NULL
            RETURNING id, counter_id, user_id, start_time, end_time
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Close whatever session the user has open. Used on logout.
    pub async fn end_open_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<CounterSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("end_open_session_for_user");
        let result = sqlx::query_as::<_, CounterSessionEntity>(
            r#"
            UPDATE counter_sessions
            SET end_time = NOW()
            WHERE user_id = $1 AND end_time IS NULL
            RETURNING id, counter_id, user_id, start_time, end_time
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_open_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<OpenSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_open_session_for_user");
        let result = sqlx::query_as::<_, OpenSessionEntity>(
            r#"
            SELECT cs.id, cs.counter_id, cs.user_id, cs.start_time, cs.end_time,
                   c.branch_id, c.number AS counter_number
            FROM counter_sessions cs
            JOIN counters c ON c.id = cs.counter_id
            WHERE cs.user_id = $1 AND cs.end_time IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_open_for_counter(
        &self,
        counter_id: i64,
    ) -> Result<Option<OpenSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_open_session_for_counter");
        let result = sqlx::query_as::<_, OpenSessionEntity>(
            r#"
            SELECT cs.id, cs.counter_id, cs.user_id, cs.start_time, cs.end_time,
                   c.branch_id, c.number AS counter_number
            FROM counter_sessions cs
            JOIN counters c ON c.id = cs.counter_id
            WHERE cs.counter_id = $1 AND cs.end_time IS NULL
            "#,
        )
        .bind(counter_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Counter of the user's most recently closed session, provided it is
    /// active, in an active branch, unoccupied, and inside `branch_id` when given.
    pub async fn find_last_used_counter(
        &self,
        user_id: i64,
        branch_id: Option<i64>,
    ) -> Result<Option<LastUsedCounterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_last_used_counter");
        let result = sqlx::query_as::<_, LastUsedCounterEntity>(
            r#"
            WITH last_closed AS (
                SELECT counter_id, end_time
                FROM counter_sessions
                WHERE user_id = $1 AND end_time IS NOT NULL
                ORDER BY end_time DESC, id DESC
                LIMIT 1
            )
            SELECT c.id AS counter_id, c.branch_id, c.number AS counter_number,
                   lc.end_time AS last_session_ended_at
            FROM last_closed lc
            JOIN counters c ON c.id = lc.counter_id
            JOIN branches b ON b.id = c.branch_id
            WHERE c.is_active = true
              AND b.is_active = true
              AND ($2::BIGINT IS NULL OR c.branch_id = $2)
              AND NOT EXISTS (
                  SELECT 1 FROM counter_sessions os
                  WHERE os.counter_id = c.id AND os.end_time IS NULL
              )
            "#,
        )
        .bind(user_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
