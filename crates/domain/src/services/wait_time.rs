//! Wait-time estimation.
//!
//! `ceil(waiting * avg_minutes / max(active_counters, 1))`. With no counter
//! open the estimate assumes a single server instead of becoming undefined.

/// Estimates minutes until a newly waiting customer is called.
pub fn estimate_wait_minutes(
    waiting_count: i64,
    avg_service_time_minutes: f64,
    active_counters: i64,
) -> i64 {
    if waiting_count <= 0 || avg_service_time_minutes <= 0.0 {
        return 0;
    }

    let servers = active_counters.max(1) as f64;
    (waiting_count as f64 * avg_service_time_minutes / servers).ceil() as i64
}
