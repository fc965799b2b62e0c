//! Counter repository for database operations.

use sqlx::PgPool;

use crate::entities::{CounterEntity, CounterWithOccupancyEntity};
use crate::metrics::QueryTimer;

/// Repository for counter-related database operations.
#[derive(Clone)]
pub struct CounterRepository {
    pool: PgPool,
}

impl CounterRepository {
    /// Creates a new CounterRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a counter. A duplicate number within the branch violates
    /// `counters_branch_number_key`.
    pub async fn create(&self, branch_id: i64, number: i32) -> Result<CounterEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_counter");
        let result = sqlx::query_as::<_, CounterEntity>(
            r#"
            INSERT INTO counters (branch_id, number)
            VALUES ($1, $2)
            RETURNING id, branch_id, number, is_active, created_at, updated_at
            "#,
        )
        .bind(branch_id)
        .bind(number)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CounterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_counter_by_id");
        let result = sqlx::query_as::<_, CounterEntity>(
            r#"
            SELECT id, branch_id, number, is_active, created_at, updated_at
            FROM counters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Counters of a branch with the session currently occupying each.
    pub async fn list_with_occupancy(
        &self,
        branch_id: i64,
        include_inactive: bool,
    ) -> Result<Vec<CounterWithOccupancyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_counters_with_occupancy");
        let result = sqlx::query_as::<_, CounterWithOccupancyEntity>(
            r#"
            SELECT c.id, c.branch_id, c.number, c.is_active, c.created_at,
                   cs.id AS session_id,
                   cs.user_id AS session_user_id,
                   u.username AS session_username,
                   cs.start_time AS session_start_time
            FROM counters c
            LEFT JOIN counter_sessions cs ON cs.counter_id = c.id AND cs.end_time IS NULL
            LEFT JOIN users u ON u.id = cs.user_id
            WHERE c.branch_id = $1 AND (c.is_active = true OR $2)
            ORDER BY c.number
            "#,
        )
        .bind(branch_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
    ) -> Result<Option<CounterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_counter_active");
        let result = sqlx::query_as::<_, CounterEntity>(
            r#"
            UPDATE counters
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, branch_id, number, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
