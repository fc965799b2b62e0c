//! Domain error taxonomy.
//!
//! Every known failure carries a stable machine-readable code so clients
//! select their user-facing message by code, never by message text.

use thiserror::Error;

use crate::models::ticket::TicketStatus;

/// Broad classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
}

/// Errors raised by queue, counter session and staff operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Branch not found")]
    BranchNotFound,

    #[error("Counter not found")]
    CounterNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Counter session not found")]
    SessionNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("No customers waiting")]
    NoWaitingTickets,

    #[error("No active counter session for this counter")]
    NoActiveSession,

    #[error("Counter already occupied.")]
    CounterOccupied,

    #[error("User already has an active counter session")]
    UserHasActiveSession,

    #[error("Ticket already completed")]
    TicketAlreadyCompleted,

    #[error("Cannot move ticket from {from} to {to}")]
    InvalidTicketTransition { from: TicketStatus, to: TicketStatus },

    #[error("Ticket is not claimed by your counter")]
    TicketNotAtCounter,

    #[error("Counter session already ended")]
    SessionAlreadyEnded,

    #[error("Counter belongs to another branch")]
    BranchMismatch,

    #[error("Counter number already exists in this branch")]
    DuplicateCounterNumber,

    #[error("Username already taken")]
    DuplicateUsername,
}

impl QueueError {
    /// Builds a validation error for a single request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        QueueError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable snake_case code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::Validation { .. } => "validation_error",
            QueueError::BranchNotFound => "branch_not_found",
            QueueError::CounterNotFound => "counter_not_found",
            QueueError::TicketNotFound => "ticket_not_found",
            QueueError::SessionNotFound => "session_not_found",
            QueueError::UserNotFound => "user_not_found",
            QueueError::NoWaitingTickets => "no_waiting_tickets",
            QueueError::NoActiveSession => "no_active_session",
            QueueError::CounterOccupied => "counter_occupied",
            QueueError::UserHasActiveSession => "user_has_active_session",
            QueueError::TicketAlreadyCompleted => "ticket_already_completed",
            QueueError::InvalidTicketTransition { .. } => "invalid_ticket_transition",
            QueueError::TicketNotAtCounter => "ticket_not_at_counter",
            QueueError::SessionAlreadyEnded => "session_already_ended",
            QueueError::BranchMismatch => "branch_mismatch",
            QueueError::DuplicateCounterNumber => "duplicate_counter_number",
            QueueError::DuplicateUsername => "duplicate_username",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueueError::Validation { .. } => ErrorKind::Validation,
            QueueError::BranchNotFound
            | QueueError::CounterNotFound
            | QueueError::TicketNotFound
            | QueueError::SessionNotFound
            | QueueError::UserNotFound
            | QueueError::NoWaitingTickets => ErrorKind::NotFound,
            QueueError::NoActiveSession
            | QueueError::CounterOccupied
            | QueueError::UserHasActiveSession
            | QueueError::TicketAlreadyCompleted
            | QueueError::InvalidTicketTransition { .. }
            | QueueError::SessionAlreadyEnded
            | QueueError::DuplicateCounterNumber
            | QueueError::DuplicateUsername => ErrorKind::Conflict,
            QueueError::TicketNotAtCounter | QueueError::BranchMismatch => ErrorKind::Forbidden,
        }
    }

    /// The request field at fault, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            QueueError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
