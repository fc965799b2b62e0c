//! Branch repository for database operations.

use sqlx::PgPool;

use crate::entities::BranchEntity;
use crate::metrics::QueryTimer;

/// Repository for branch-related database operations.
#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    /// Creates a new BranchRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> Result<BranchEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_branch");
        let result = sqlx::query_as::<_, BranchEntity>(
            r#"
            INSERT INTO branches (name)
            VALUES ($1)
            RETURNING id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a branch by ID regardless of its active flag.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<BranchEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_branch_by_id");
        let result = sqlx::query_as::<_, BranchEntity>(
            r#"
            SELECT id, name, is_active, created_at, updated_at
            FROM branches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a branch by ID only if it is active.
    pub async fn find_active(&self, id: i64) -> Result<Option<BranchEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_branch");
        let result = sqlx::query_as::<_, BranchEntity>(
            r#"
            SELECT id, name, is_active, created_at, updated_at
            FROM branches
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<BranchEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_branches");
        let result = sqlx::query_as::<_, BranchEntity>(
            r#"
            SELECT id, name, is_active, created_at, updated_at
            FROM branches
            WHERE is_active = true OR $1
            ORDER BY name
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Activate or deactivate a branch. Returns None when the branch does not exist.
    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
    ) -> Result<Option<BranchEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_branch_active");
        let result = sqlx::query_as::<_, BranchEntity>(
            r#"
            UPDATE branches
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, is_active, created_at, updated_at
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
