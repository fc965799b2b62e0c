//! Counter session entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{CounterSession, LastUsedCounter};
use sqlx::FromRow;

/// Database row mapping for the counter_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct CounterSessionEntity {
    pub id: i64,
    pub counter_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<CounterSessionEntity> for CounterSession {
    fn from(entity: CounterSessionEntity) -> Self {
        Self {
            id: entity.id,
            counter_id: entity.counter_id,
            user_id: entity.user_id,
            start_time: entity.start_time,
            end_time: entity.end_time,
        }
    }
}

/// Open session joined with its counter.
#[derive(Debug, Clone, FromRow)]
pub struct OpenSessionEntity {
    pub id: i64,
    pub counter_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub branch_id: i64,
    pub counter_number: i32,
}

impl OpenSessionEntity {
    pub fn session(&self) -> CounterSession {
        CounterSession {
            id: self.id,
            counter_id: self.counter_id,
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Most recently closed session whose counter is free again.
#[derive(Debug, Clone, FromRow)]
pub struct LastUsedCounterEntity {
    pub counter_id: i64,
    pub branch_id: i64,
    pub counter_number: i32,
    pub last_session_ended_at: DateTime<Utc>,
}

impl From<LastUsedCounterEntity> for LastUsedCounter {
    fn from(entity: LastUsedCounterEntity) -> Self {
        Self {
            counter_id: entity.counter_id,
            branch_id: entity.branch_id,
            counter_number: entity.counter_number,
            last_session_ended_at: entity.last_session_ended_at,
        }
    }
}
