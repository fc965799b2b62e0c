//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration under its query name.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Record connection pool gauges. Called before each metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("call_next_ticket");
/// let result = sqlx::query_as::<_, TicketEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("issue_ticket");
        assert_eq!(timer.query_name, "issue_ticket");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        // No global recorder installed in unit tests; recording must not panic.
        QueryTimer::new("noop").record();
    }
}
