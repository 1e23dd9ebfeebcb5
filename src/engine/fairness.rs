// ==========================================
// Duty Roster - fairness ledger
// ==========================================
// Per-guard running load figures, rebuilt from the full assignment
// history at the start of every pass and threaded through candidate
// ranking. Never a shared global: each pass constructs its own ledger.
// ==========================================

use crate::domain::shift::Shift;
use crate::domain::types::GuardId;
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::HashMap;

/// Load figures for one guard
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardLoad {
    /// Lifetime assigned hours
    pub total_hours: f64,
    /// Hours assigned inside the current pass window
    pub window_hours: f64,
    /// Lifetime count of night ("black") shifts
    pub black_shifts: u32,
}

/// Whether a shift counts as a night ("black") shift: its interval
/// midpoint falls inside [start_hour, end_hour) local time.
pub fn is_black_shift(shift: &Shift, black_start_hour: u32, black_end_hour: u32) -> bool {
    let mid = shift.midpoint().time();
    let start = NaiveTime::from_hms_opt(black_start_hour.min(23), 0, 0).unwrap();
    // end_hour == 24 means "until midnight"
    if black_end_hour >= 24 {
        return mid >= start;
    }
    let end = NaiveTime::from_hms_opt(black_end_hour, 0, 0).unwrap();
    if start <= end {
        mid >= start && mid < end
    } else {
        mid >= start || mid < end
    }
}

// ==========================================
// FairnessLedger
// ==========================================
#[derive(Debug)]
pub struct FairnessLedger {
    loads: HashMap<GuardId, GuardLoad>,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    black_start_hour: u32,
    black_end_hour: u32,
}

impl FairnessLedger {
    /// Build the ledger from all historical assigned shifts (not only the
    /// pass window): lifetime hours, in-window hours and black-shift counts.
    pub fn seed(
        history: &[Shift],
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        black_start_hour: u32,
        black_end_hour: u32,
    ) -> Self {
        let mut ledger = Self {
            loads: HashMap::new(),
            window_start,
            window_end,
            black_start_hour,
            black_end_hour,
        };
        for shift in history {
            for guard_id in shift.assigned.iter() {
                ledger.credit(guard_id, shift);
            }
        }
        ledger
    }

    /// Load figures for a guard (zeroes when unseen)
    pub fn load(&self, guard_id: GuardId) -> GuardLoad {
        self.loads.get(&guard_id).copied().unwrap_or_default()
    }

    /// Record a fresh in-pass assignment
    pub fn record_assignment(&mut self, guard_id: GuardId, shift: &Shift) {
        self.credit(guard_id, shift);
    }

    /// Whether a shift is black under this ledger's night window
    pub fn is_black(&self, shift: &Shift) -> bool {
        is_black_shift(shift, self.black_start_hour, self.black_end_hour)
    }

    fn credit(&mut self, guard_id: GuardId, shift: &Shift) {
        let duration = shift.duration_hours();
        let in_window =
            shift.start_time >= self.window_start && shift.start_time < self.window_end;
        let black = self.is_black(shift);

        let load = self.loads.entry(guard_id).or_default();
        load.total_hours += duration;
        if in_window {
            load.window_hours += duration;
        }
        if black {
            load.black_shifts += 1;
        }
    }
}
