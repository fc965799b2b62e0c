//! Domain services for Queuematic.
//!
//! Pure business rules that do not touch the store.

pub mod history_stats;
pub mod wait_time;

pub use history_stats::summarize;
pub use wait_time::estimate_wait_minutes;
