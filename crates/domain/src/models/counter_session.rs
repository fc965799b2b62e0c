//! Counter session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ticket::Ticket;

/// One staff member occupying one counter. `end_time == None` means open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSession {
    pub id: i64,
    pub counter_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CounterSession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// The caller's open session with enough context to resume work.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub session: CounterSession,
    pub branch_id: i64,
    pub counter_number: i32,
    /// Ticket currently called or being served at this counter.
    pub current_ticket: Option<Ticket>,
}

/// A previously used counter that is free to resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUsedCounter {
    pub counter_id: i64,
    pub branch_id: i64,
    pub counter_number: i32,
    pub last_session_ended_at: DateTime<Utc>,
}
