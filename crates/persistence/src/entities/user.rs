//! Staff user entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, StaffUser};
use sqlx::FromRow;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Admin,
    Clerk,
}

impl From<UserRoleDb> for Role {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Admin => Role::Admin,
            UserRoleDb::Clerk => Role::Clerk,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => UserRoleDb::Admin,
            Role::Clerk => UserRoleDb::Clerk,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRoleDb,
    pub branch_id: Option<i64>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for StaffUser {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            full_name: entity.full_name,
            role: entity.role.into(),
            branch_id: entity.branch_id,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
