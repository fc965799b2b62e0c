//! Counter entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Counter, CounterOccupant, CounterOverview};
use sqlx::FromRow;

/// Database row mapping for the counters table.
#[derive(Debug, Clone, FromRow)]
pub struct CounterEntity {
    pub id: i64,
    pub branch_id: i64,
    pub number: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CounterEntity> for Counter {
    fn from(entity: CounterEntity) -> Self {
        Self {
            id: entity.id,
            branch_id: entity.branch_id,
            number: entity.number,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

/// Counter joined with its open session, if any.
#[derive(Debug, Clone, FromRow)]
pub struct CounterWithOccupancyEntity {
    pub id: i64,
    pub branch_id: i64,
    pub number: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub session_id: Option<i64>,
    pub session_user_id: Option<i64>,
    pub session_username: Option<String>,
    pub session_start_time: Option<DateTime<Utc>>,
}

impl From<CounterWithOccupancyEntity> for CounterOverview {
    fn from(entity: CounterWithOccupancyEntity) -> Self {
        let occupied_by = match (
            entity.session_id,
            entity.session_user_id,
            entity.session_username,
            entity.session_start_time,
        ) {
            (Some(session_id), Some(user_id), Some(username), Some(since)) => {
                Some(CounterOccupant {
                    session_id,
                    user_id,
                    username,
                    since,
                })
            }
            _ => None,
        };

        Self {
            counter: Counter {
                id: entity.id,
                branch_id: entity.branch_id,
                number: entity.number,
                is_active: entity.is_active,
                created_at: entity.created_at,
            },
            occupied_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(session: bool) -> CounterWithOccupancyEntity {
        CounterWithOccupancyEntity {
            id: 5,
            branch_id: 1,
            number: 2,
            is_active: true,
            created_at: Utc::now(),
            session_id: session.then_some(9),
            session_user_id: session.then_some(3),
            session_username: session.then(|| "clerk1".to_string()),
            session_start_time: session.then(Utc::now),
        }
    }

    #[test]
    fn test_free_counter() {
        let overview: CounterOverview = row(false).into();
        assert!(overview.occupied_by.is_none());
        assert!(overview.is_available());
    }

    #[test]
    fn test_occupied_counter() {
        let overview: CounterOverview = row(true).into();
        let occupant = overview.occupied_by.as_ref().unwrap();
        assert_eq!(occupant.session_id, 9);
        assert_eq!(occupant.username, "clerk1");
        assert!(!overview.is_available());
    }
}
