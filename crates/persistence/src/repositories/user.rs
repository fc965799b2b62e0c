//! Staff user repository for database operations.

use sqlx::PgPool;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, username, password_hash, full_name, role, branch_id, \
                            is_active, last_login_at, created_at, updated_at";

/// Repository for staff account database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRoleDb,
        branch_id: Option<i64>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (username, password_hash, full_name, role, branch_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Case-insensitive lookup used at login.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List staff, optionally restricted to one branch.
    pub async fn list(&self, branch_id: Option<i64>) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::BIGINT IS NULL OR branch_id = $1
            ORDER BY username
            "#
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_active");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Replace a user's password hash. Returns false when the user does not exist.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_user_password");
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn update_assignment(
        &self,
        id: i64,
        role: UserRoleDb,
        branch_id: Option<i64>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_assignment");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET role = $2, branch_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn record_login(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether any active admin account exists.
    pub async fn admin_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin' AND is_active = true)",
        )
        .fetch_one(&self.pool)
        .await
    }
}
