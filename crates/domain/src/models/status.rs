//! Read-only snapshots polled by the customer, clerk and display views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ticket::TicketStatus;

/// A ticket attached to a counter (called or being served).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalledTicket {
    pub ticket_id: i64,
    pub number: i32,
    pub status: TicketStatus,
    pub counter_id: i64,
    pub counter_number: i32,
    pub called_at: DateTime<Utc>,
}

/// A ticket still waiting in line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingTicket {
    pub ticket_id: i64,
    pub number: i32,
    pub created_at: DateTime<Utc>,
}

/// A recently finished ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTicket {
    pub ticket_id: i64,
    pub number: i32,
    pub counter_id: Option<i64>,
    pub counter_number: Option<i32>,
    pub completed_at: DateTime<Utc>,
}

/// Branch status for the customer and clerk views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStatusSnapshot {
    pub branch_id: i64,
    pub waiting_count: i64,
    pub serving_count: i64,
    pub active_counters: i64,
    pub completed_today: i64,
    pub last_called: Option<CalledTicket>,
    pub estimated_wait_minutes: i64,
    /// Ticket issuance never depends on staff availability.
    pub can_take_number: bool,
}

impl BranchStatusSnapshot {
    /// A snapshot with every count at zero.
    pub fn empty(branch_id: i64) -> Self {
        Self {
            branch_id,
            waiting_count: 0,
            serving_count: 0,
            active_counters: 0,
            completed_today: 0,
            last_called: None,
            estimated_wait_minutes: 0,
            can_take_number: true,
        }
    }
}

/// Public display board contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub branch_id: i64,
    pub now_serving: Vec<CalledTicket>,
    pub waiting: Vec<WaitingTicket>,
    pub recently_completed: Vec<CompletedTicket>,
    pub waiting_count: i64,
    pub active_counters: i64,
    pub completed_today: i64,
}

impl DisplaySnapshot {
    pub fn empty(branch_id: i64) -> Self {
        Self {
            branch_id,
            now_serving: Vec::new(),
            waiting: Vec::new(),
            recently_completed: Vec::new(),
            waiting_count: 0,
            active_counters: 0,
            completed_today: 0,
        }
    }
}
