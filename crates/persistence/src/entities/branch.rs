//! Branch entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the branches table.
#[derive(Debug, Clone, FromRow)]
pub struct BranchEntity {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BranchEntity> for domain::models::Branch {
    fn from(entity: BranchEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
