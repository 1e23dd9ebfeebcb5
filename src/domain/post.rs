// ==========================================
// Duty Roster - post entity
// ==========================================
// A post is a fixed duty location with its own shift length, staffing
// level and daily activity window. The activity and boost windows are
// times of day and may wrap midnight (e.g. 22:00-04:00).
// Aligned with: posts table
// ==========================================

use crate::domain::types::PostId;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub name: String,
    pub shift_minutes: i64,
    pub required_guards: u32,
    pub active_from: NaiveTime,
    pub active_to: NaiveTime,
    pub boost_from: Option<NaiveTime>,
    pub boost_to: Option<NaiveTime>,
    pub boost_guards: u32,
    pub requires_commander: bool,
}

impl Post {
    /// Whether the post is active at the given time of day (wrap-aware)
    pub fn is_active_at(&self, t: NaiveTime) -> bool {
        time_in_window(self.active_from, self.active_to, t)
    }

    /// Whether the boost window covers the given time of day
    pub fn is_boosted_at(&self, t: NaiveTime) -> bool {
        if self.boost_guards == 0 {
            return false;
        }
        match (self.boost_from, self.boost_to) {
            (Some(from), Some(to)) => time_in_window(from, to, t),
            _ => false,
        }
    }

    /// Required guard count for a slot starting at the given time of day.
    ///
    /// This is evaluated once, at slot generation; later edits to the post
    /// never resize existing shifts.
    pub fn required_at(&self, t: NaiveTime) -> u32 {
        if self.is_boosted_at(t) {
            self.required_guards + self.boost_guards
        } else {
            self.required_guards
        }
    }
}

/// Inclusive time-of-day window test, wrapping midnight when from > to.
pub fn time_in_window(from: NaiveTime, to: NaiveTime, t: NaiveTime) -> bool {
    if from <= to {
        from <= t && t <= to
    } else {
        t >= from || t <= to
    }
}
