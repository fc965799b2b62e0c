//! Queue ticket entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{
    CalledTicket, CompletedTicket, ServedTicket, Ticket, TicketStatus, WaitingTicket,
};
use sqlx::FromRow;

/// Database enum for ticket_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
pub enum TicketStatusDb {
    Waiting,
    Called,
    Serving,
    Completed,
}

impl From<TicketStatusDb> for TicketStatus {
    fn from(status: TicketStatusDb) -> Self {
        match status {
            TicketStatusDb::Waiting => TicketStatus::Waiting,
            TicketStatusDb::Called => TicketStatus::Called,
            TicketStatusDb::Serving => TicketStatus::Serving,
            TicketStatusDb::Completed => TicketStatus::Completed,
        }
    }
}

impl From<TicketStatus> for TicketStatusDb {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Waiting => TicketStatusDb::Waiting,
            TicketStatus::Called => TicketStatusDb::Called,
            TicketStatus::Serving => TicketStatusDb::Serving,
            TicketStatus::Completed => TicketStatusDb::Completed,
        }
    }
}

/// Database row mapping for the queue table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEntity {
    pub id: i64,
    pub branch_id: i64,
    pub queue_date: NaiveDate,
    pub number: i32,
    pub status: TicketStatusDb,
    pub counter_id: Option<i64>,
    pub served_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub serving_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TicketEntity> for Ticket {
    fn from(entity: TicketEntity) -> Self {
        Self {
            id: entity.id,
            branch_id: entity.branch_id,
            number: entity.number,
            status: entity.status.into(),
            counter_id: entity.counter_id,
            created_at: entity.created_at,
            called_at: entity.called_at,
            serving_at: entity.serving_at,
            completed_at: entity.completed_at,
        }
    }
}

/// Called or serving ticket joined with its counter number.
#[derive(Debug, Clone, FromRow)]
pub struct CalledTicketEntity {
    pub ticket_id: i64,
    pub number: i32,
    pub status: TicketStatusDb,
    pub counter_id: i64,
    pub counter_number: i32,
    pub called_at: DateTime<Utc>,
}

impl From<CalledTicketEntity> for CalledTicket {
    fn from(entity: CalledTicketEntity) -> Self {
        Self {
            ticket_id: entity.ticket_id,
            number: entity.number,
            status: entity.status.into(),
            counter_id: entity.counter_id,
            counter_number: entity.counter_number,
            called_at: entity.called_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WaitingTicketEntity {
    pub ticket_id: i64,
    pub number: i32,
    pub created_at: DateTime<Utc>,
}

impl From<WaitingTicketEntity> for WaitingTicket {
    fn from(entity: WaitingTicketEntity) -> Self {
        Self {
            ticket_id: entity.ticket_id,
            number: entity.number,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CompletedTicketEntity {
    pub ticket_id: i64,
    pub number: i32,
    pub counter_id: Option<i64>,
    pub counter_number: Option<i32>,
    pub completed_at: DateTime<Utc>,
}

impl From<CompletedTicketEntity> for CompletedTicket {
    fn from(entity: CompletedTicketEntity) -> Self {
        Self {
            ticket_id: entity.ticket_id,
            number: entity.number,
            counter_id: entity.counter_id,
            counter_number: entity.counter_number,
            completed_at: entity.completed_at,
        }
    }
}

/// Completed ticket attributed to a clerk, with its service duration.
#[derive(Debug, Clone, FromRow)]
pub struct ServedTicketEntity {
    pub ticket_id: i64,
    pub number: i32,
    pub branch_id: i64,
    pub counter_id: i64,
    pub counter_number: i32,
    pub called_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    pub service_seconds: Option<i64>,
}

impl From<ServedTicketEntity> for ServedTicket {
    fn from(entity: ServedTicketEntity) -> Self {
        Self {
            ticket_id: entity.ticket_id,
            number: entity.number,
            branch_id: entity.branch_id,
            counter_id: entity.counter_id,
            counter_number: entity.counter_number,
            called_at: entity.called_at,
            completed_at: entity.completed_at,
            service_seconds: entity.service_seconds,
        }
    }
}

/// Aggregate counts for one branch.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct BranchCountsEntity {
    pub waiting_count: i64,
    pub serving_count: i64,
    pub completed_today: i64,
    pub active_counters: i64,
}
