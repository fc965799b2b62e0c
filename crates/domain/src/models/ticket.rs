//! Queue ticket domain model and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Lifecycle state of a queue ticket.
///
/// Canonical flow is waiting -> called -> serving -> completed. Serving is
/// optional: a called ticket may be completed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Waiting,
    Called,
    Serving,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Called => "called",
            TicketStatus::Serving => "serving",
            TicketStatus::Completed => "completed",
        }
    }

    /// Whether a ticket in this state is attached to a counter.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TicketStatus::Called | TicketStatus::Serving)
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Waiting, TicketStatus::Called)
                | (TicketStatus::Called, TicketStatus::Serving)
                | (TicketStatus::Called, TicketStatus::Completed)
                | (TicketStatus::Serving, TicketStatus::Completed)
        )
    }

    /// Checks a transition, reporting completed tickets distinctly.
    pub fn ensure_transition(&self, next: TicketStatus) -> Result<(), QueueError> {
        if *self == TicketStatus::Completed {
            return Err(QueueError::TicketAlreadyCompleted);
        }
        if !self.can_transition_to(next) {
            return Err(QueueError::InvalidTicketTransition {
                from: *self,
                to: next,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(TicketStatus::Waiting),
            "called" => Ok(TicketStatus::Called),
            "serving" => Ok(TicketStatus::Serving),
            "completed" => Ok(TicketStatus::Completed),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// One customer's place in line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub branch_id: i64,
    pub number: i32,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response to a customer taking a number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Tickets already waiting ahead of this one.
    pub waiting_ahead: i64,
    pub estimated_wait_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TicketStatus; 4] = [
        TicketStatus::Waiting,
        TicketStatus::Called,
        TicketStatus::Serving,
        TicketStatus::Completed,
    ];

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(TicketStatus::Waiting.can_transition_to(TicketStatus::Called));
        assert!(TicketStatus::Called.can_transition_to(TicketStatus::Serving));
        assert!(TicketStatus::Called.can_transition_to(TicketStatus::Completed));
        assert!(TicketStatus::Serving.can_transition_to(TicketStatus::Completed));
    }

    #[test]
    fn test_no_backward_or_self_transitions() {
        for (i, from) in ALL.iter().enumerate() {
            for to in ALL.iter().take(i + 1) {
                assert!(
                    !from.can_transition_to(*to),
                    "{} -> {} must be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_waiting_cannot_skip_to_completed() {
        let err = TicketStatus::Waiting
            .ensure_transition(TicketStatus::Completed)
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::InvalidTicketTransition {
                from: TicketStatus::Waiting,
                to: TicketStatus::Completed
            }
        );
    }

    #[test]
    fn test_called_twice_rejected() {
        assert!(TicketStatus::Called
            .ensure_transition(TicketStatus::Called)
            .is_err());
    }

    #[test]
    fn test_completed_reports_already_completed() {
        for next in ALL {
            assert_eq!(
                TicketStatus::Completed.ensure_transition(next),
                Err(QueueError::TicketAlreadyCompleted)
            );
        }
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_in_progress() {
        assert!(!TicketStatus::Waiting.is_in_progress());
        assert!(TicketStatus::Called.is_in_progress());
        assert!(TicketStatus::Serving.is_in_progress());
        assert!(!TicketStatus::Completed.is_in_progress());
    }

    #[test]
    fn test_ticket_serializes_camel_case() {
        let ticket = Ticket {
            id: 10,
            branch_id: 1,
            number: 1,
            status: TicketStatus::Waiting,
            counter_id: None,
            created_at: Utc::now(),
            called_at: None,
            serving_at: None,
            completed_at: None,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["branchId"], 1);
        assert_eq!(json["status"], "waiting");
        assert!(json.get("counterId").is_none());
    }

    #[test]
    fn test_issued_ticket_flattens() {
        let issued = IssuedTicket {
            ticket: Ticket {
                id: 3,
                branch_id: 2,
                number: 7,
                status: TicketStatus::Waiting,
                counter_id: None,
                created_at: Utc::now(),
                called_at: None,
                serving_at: None,
                completed_at: None,
            },
            waiting_ahead: 6,
            estimated_wait_minutes: 15,
        };
        let json = serde_json::to_value(&issued).unwrap();
        assert_eq!(json["number"], 7);
        assert_eq!(json["waitingAhead"], 6);
        assert_eq!(json["estimatedWaitMinutes"], 15);
    }
}
