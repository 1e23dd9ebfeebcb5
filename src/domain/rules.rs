// ==========================================
// Duty Roster - policy rule entities
// ==========================================
// Hard constraints layered over the assignment engine:
// - AvailabilityConstraint: per-guard time blackout
// - PairingRule: symmetric must/must-not co-assignment relation
// - PostExclusion: permanent per-post ban for one guard
// ==========================================

use crate::domain::types::{GuardId, PairingKind, PostId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// AvailabilityConstraint - hard blackout interval
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConstraint {
    pub id: i64,
    pub guard_id: GuardId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
}

impl AvailabilityConstraint {
    /// Whether the blackout overlaps the given interval
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Reason text for display, with a generic fallback
    pub fn reason_text(&self) -> &str {
        self.reason.as_deref().unwrap_or("personal constraint")
    }
}

// ==========================================
// PairingRule - symmetric guard pair relation
// ==========================================
// The pair is unordered; the engine indexes it under both orderings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingRule {
    pub id: i64,
    pub first_guard_id: GuardId,
    pub second_guard_id: GuardId,
    pub kind: PairingKind,
}

// ==========================================
// PostExclusion - permanent guard x post ban
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostExclusion {
    pub id: i64,
    pub guard_id: GuardId,
    pub post_id: PostId,
}
