use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moves::{Move, Outcome};

/// High-level event kinds moving through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    Round,
    Ops,
}

/// Immutable event envelope for logging and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecycleEvent),
    RoundStarted { round: u32 },
    RoundResolved(RoundRecord),
    Ops(OpsEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecyclePhase {
    Boot,
    Ready,
    Shutdown,
}

/// Committed result of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub player_move: Move,
    pub cpu_move: Move,
    pub outcome: Outcome,
    /// False when the player move fell back to the default.
    pub gesture_seen: bool,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsEvent {
    pub message: String,
    pub tags: Vec<String>,
}

impl GameEvent {
    pub fn new(payload: EventPayload) -> Self {
        let kind = match &payload {
            EventPayload::Lifecycle(_) => EventKind::Lifecycle,
            EventPayload::RoundStarted { .. } | EventPayload::RoundResolved(_) => EventKind::Round,
            EventPayload::Ops(_) => EventKind::Ops,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn lifecycle(phase: LifecyclePhase, details: impl Into<String>) -> Self {
        Self::new(EventPayload::Lifecycle(LifecycleEvent {
            phase,
            details: Some(details.into()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload() {
        let started = GameEvent::new(EventPayload::RoundStarted { round: 1 });
        assert_eq!(started.kind, EventKind::Round);
        let boot = GameEvent::lifecycle(LifecyclePhase::Boot, "boot");
        assert_eq!(boot.kind, EventKind::Lifecycle);
        assert_ne!(started.id, boot.id);
    }

    #[test]
    fn round_record_serializes_as_json_line() {
        let event = GameEvent::new(EventPayload::RoundResolved(RoundRecord {
            round: 2,
            player_move: Move::Rock,
            cpu_move: Move::Scissors,
            outcome: Outcome::PlayerWins,
            gesture_seen: true,
            resolved_at: Utc::now(),
        }));
        let line = serde_json::to_string(&event).expect("serialize event");
        assert!(!line.contains('\n'));
        let back: GameEvent = serde_json::from_str(&line).expect("parse event");
        match back.payload {
            EventPayload::RoundResolved(record) => {
                assert_eq!(record.outcome, Outcome::PlayerWins)
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
