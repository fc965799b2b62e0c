//! Application services. Built per request from the shared pool.

use tracing::warn;

use crate::middleware::metrics::record_aggregator_fallback;

pub mod admin;
pub mod admin_bootstrap;
pub mod auth;
pub mod counter_session;
pub mod queue;
pub mod status;

pub use admin::AdminService;
pub use auth::AuthService;
pub use counter_session::CounterSessionService;
pub use queue::QueueService;
pub use status::StatusAggregator;

/// Returns the query result, or `fallback` after logging the failure.
///
/// Used by read-only lookups that must answer even when the database does not.
pub(crate) fn or_fallback<T>(query: &'static str, result: Result<T, sqlx::Error>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(query, error = %e, "Read query failed, serving fallback");
            record_aggregator_fallback(query);
            fallback
        }
    }
}
