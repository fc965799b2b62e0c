//! Domain models for Queuematic.

pub mod branch;
pub mod counter;
pub mod counter_session;
pub mod history;
pub mod status;
pub mod ticket;
pub mod user;

pub use branch::Branch;
pub use counter::{Counter, CounterOccupant, CounterOverview};
pub use counter_session::{ActiveSession, CounterSession, LastUsedCounter};
pub use history::{HistoryStats, ServedTicket, WorkHistory};
pub use status::{
    BranchStatusSnapshot, CalledTicket, CompletedTicket, DisplaySnapshot, WaitingTicket,
};
pub use ticket::{IssuedTicket, Ticket, TicketStatus};
pub use user::{Role, StaffUser};
