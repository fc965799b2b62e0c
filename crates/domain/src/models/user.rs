//! Staff user domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Clerk,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Clerk => "clerk",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "clerk" => Ok(Role::Clerk),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A staff account, without its credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// Nullable for admins.
    pub branch_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
