//! Repository implementations for database operations.

pub mod branch;
pub mod counter;
pub mod counter_session;
pub mod queue;
pub mod user;

pub use branch::BranchRepository;
pub use counter::CounterRepository;
pub use counter_session::{CounterSessionRepository, StartSessionOutcome};
pub use queue::{IssuedTicketRow, QueueRepository};
pub use user::UserRepository;
