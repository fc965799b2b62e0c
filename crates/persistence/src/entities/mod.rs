//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod branch;
pub mod counter;
pub mod counter_session;
pub mod ticket;
pub mod user;

pub use branch::BranchEntity;
pub use counter::{CounterEntity, CounterWithOccupancyEntity};
pub use counter_session::{CounterSessionEntity, LastUsedCounterEntity, OpenSessionEntity};
pub use ticket::{
    BranchCountsEntity, CalledTicketEntity, CompletedTicketEntity, ServedTicketEntity,
    TicketEntity, TicketStatusDb, WaitingTicketEntity,
};
pub use user::{UserEntity, UserRoleDb};
