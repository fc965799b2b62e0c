//! Per-clerk work history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A ticket a clerk completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServedTicket {
    pub ticket_id: i64,
    pub number: i32,
    pub branch_id: i64,
    pub counter_id: i64,
    pub counter_number: i32,
    pub called_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    pub service_seconds: Option<i64>,
}

/// Aggregate service statistics for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub completed_count: i64,
    pub total_service_seconds: i64,
    pub average_service_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHistory {
    pub user_id: i64,
    pub date: NaiveDate,
    pub tickets: Vec<ServedTicket>,
    pub stats: HistoryStats,
}

impl WorkHistory {
    pub fn empty(user_id: i64, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            tickets: Vec::new(),
            stats: HistoryStats::default(),
        }
    }
}
