//! Counter domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A numbered service window. Numbers are unique within a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub id: i64,
    pub branch_id: i64,
    pub number: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Who is currently working a counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterOccupant {
    pub session_id: i64,
    pub user_id: i64,
    pub username: String,
    pub since: DateTime<Utc>,
}

/// Counter with its current occupancy, for the counter picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterOverview {
    #[serde(flatten)]
    pub counter: Counter,
    pub occupied_by: Option<CounterOccupant>,
}

impl CounterOverview {
    pub fn is_available(&self) -> bool {
        self.counter.is_active && self.occupied_by.is_none()
    }
}
