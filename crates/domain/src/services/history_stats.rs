//! Service-duration statistics over a clerk's completed tickets.

use crate::models::{HistoryStats, ServedTicket};

/// Service duration is `completed_at - called_at`. Tickets missing a call
/// timestamp still count toward `completed_count` but not toward durations.
pub fn summarize(tickets: &[ServedTicket]) -> HistoryStats {
    let durations: Vec<i64> = tickets
        .iter()
        .filter_map(|t| {
            t.service_seconds
                .or_else(|| t.called_at.map(|c| (t.completed_at - c).num_seconds()))
        })
        .map(|secs| secs.max(0))
        .collect();

    let total: i64 = durations.iter().sum();
    let average = if durations.is_empty() {
        0.0
    } else {
        total as f64 / durations.len() as f64
    };

    HistoryStats {
        completed_count: tickets.len() as i64,
        total_service_seconds: total,
        average_service_seconds: average,
    }
}
