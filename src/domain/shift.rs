// ==========================================
// Duty Roster - shift entity and assignment list
// ==========================================
// A shift is a time-boxed duty slot at one post, created empty by the
// slot generator and mutated incrementally by manual edits or the
// assignment engine. required_count is fixed at creation.
// Aligned with: shifts table
// ==========================================

use crate::domain::types::{GuardId, PostId, ShiftId};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// AssignmentList - ordered, duplicate-free guard ids
// ==========================================
// Persisted as a comma-delimited text column; the delimited form exists
// only at the persistence boundary. Round-tripping preserves order and
// uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentList {
    ids: Vec<GuardId>,
}

impl AssignmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the delimited database form. Empty segments are dropped,
    /// unparseable segments are dropped, duplicates keep their first position.
    pub fn from_delimited(raw: &str) -> Self {
        let mut list = Self::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Ok(id) = part.parse::<GuardId>() {
                list.push(id);
            }
        }
        list
    }

    /// Delimited database form
    pub fn to_delimited(&self) -> String {
        self.ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Append a guard, preserving uniqueness. Returns false on duplicate.
    pub fn push(&mut self, id: GuardId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: GuardId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GuardId> + '_ {
        self.ids.iter().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl fmt::Display for AssignmentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_delimited())
    }
}

// ==========================================
// Shift - time-boxed duty slot
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub post_id: PostId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub assigned: AssignmentList,
    pub required_count: u32,
}

impl Shift {
    /// Shift length in hours
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }

    /// Midpoint of the shift interval (used for night-duty classification)
    pub fn midpoint(&self) -> NaiveDateTime {
        self.start_time + Duration::seconds((self.end_time - self.start_time).num_seconds() / 2)
    }

    /// Open slot count (required minus assigned, never negative)
    pub fn open_slots(&self) -> u32 {
        (self.required_count as usize).saturating_sub(self.assigned.len()) as u32
    }

    pub fn is_understaffed(&self) -> bool {
        self.assigned.len() < self.required_count as usize
    }
}
