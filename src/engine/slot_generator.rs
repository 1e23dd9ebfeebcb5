// ==========================================
// Duty Roster - slot generator
// ==========================================
// Bootstrap that pre-creates empty shifts for one day from each post's
// activity windows. required_count is fixed here (base + boost when the
// slot start falls in the boost window) and never resized afterwards,
// whatever happens to the post or the rules later.
// ==========================================

use crate::domain::shift::{AssignmentList, Shift};
use crate::engine::RosterRepositories;
use chrono::{Duration, NaiveDate};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// SlotGenerator
// ==========================================
pub struct SlotGenerator {
    repos: Arc<RosterRepositories>,
}

impl SlotGenerator {
    pub fn new(repos: Arc<RosterRepositories>) -> Self {
        Self { repos }
    }

    /// Create the day's empty shifts for every post.
    ///
    /// Walks the day in shift-length steps from 00:00; a slot is created
    /// when its start lies in the post's wrap-aware active window and no
    /// shift already exists for (post, start). Idempotent.
    ///
    /// # Returns
    /// - Ok(usize): number of shifts created
    #[instrument(skip(self), fields(day = %day))]
    pub fn generate_for_day(&self, day: NaiveDate) -> Result<usize, Box<dyn Error>> {
        let day_start = day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        let day_end = day_start + Duration::days(1);

        let posts = self.repos.posts.find_all()?;
        let mut created = 0;

        for post in &posts {
            if post.shift_minutes <= 0 {
                warn!(post_id = post.id, "post has non-positive shift length, skipped");
                continue;
            }
            let step = Duration::minutes(post.shift_minutes);

            let mut slot_start = day_start;
            while slot_start < day_end {
                let time_of_day = slot_start.time();
                if post.is_active_at(time_of_day)
                    && self
                        .repos
                        .shifts
                        .find_by_post_and_start(post.id, slot_start)?
                        .is_none()
                {
                    let shift = Shift {
                        id: 0,
                        post_id: post.id,
                        start_time: slot_start,
                        end_time: slot_start + step,
                        assigned: AssignmentList::new(),
                        required_count: post.required_at(time_of_day),
                    };
                    self.repos.shifts.create(&shift)?;
                    created += 1;
                }
                slot_start += step;
            }
        }

        info!(created, "slot generation finished");
        Ok(created)
    }
}
