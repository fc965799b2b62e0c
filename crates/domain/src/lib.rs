//! Domain layer for the Queuematic backend.
//!
//! This crate contains:
//! - Domain models (Branch, Counter, CounterSession, Ticket, snapshots)
//! - The ticket lifecycle state machine
//! - Wait-time and work-history rules
//! - The structured domain error taxonomy

pub mod error;
pub mod models;
pub mod services;

pub use error::{ErrorKind, QueueError};
