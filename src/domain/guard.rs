// ==========================================
// Duty Roster - guard entity
// ==========================================
// Aligned with: guards table
// ==========================================

use crate::domain::types::GuardId;
use serde::{Deserialize, Serialize};

// ==========================================
// Guard - person eligible for duty assignment
// ==========================================
// total_hours is a cached display counter; the authoritative load figures
// are rebuilt from shift history by the fairness ledger on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guard {
    pub id: GuardId,
    pub name: String,
    pub is_commander: bool,
    pub total_hours: f64,
}

impl Guard {
    /// Convenience constructor for a not-yet-persisted guard (id assigned on insert)
    pub fn new(name: impl Into<String>, is_commander: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            is_commander,
            total_hours: 0.0,
        }
    }
}
