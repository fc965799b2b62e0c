//! Branch domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical location. Branches are soft-deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
