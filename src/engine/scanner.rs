// ==========================================
// Duty Roster - diagnostic scanner
// ==========================================
// Read-only pass producing at most one flag message per shift in a
// window. Checks run in a fixed order and each triggering check
// overwrites the previous message for that shift (last one wins).
// This is a deliberate display simplification, not a multi-violation
// report; editors show one line per shift.
// ==========================================
// Responsibility: surface policy violations in an existing roster
// Red line: never mutates the store
// ==========================================

use crate::config::RosterConfigReader;
use crate::domain::guard::Guard;
use crate::domain::post::Post;
use crate::domain::types::{GuardId, PostId, ShiftId};
use crate::engine::RosterRepositories;
use chrono::{Duration, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::sync::Arc;
use tracing::{instrument, warn};

// ==========================================
// RosterScanner
// ==========================================
pub struct RosterScanner<C>
where
    C: RosterConfigReader,
{
    repos: Arc<RosterRepositories>,
    config: Arc<C>,
}

impl<C> RosterScanner<C>
where
    C: RosterConfigReader,
{
    pub fn new(repos: Arc<RosterRepositories>, config: Arc<C>) -> Self {
        Self { repos, config }
    }

    /// Scan shifts starting in [window_start, window_start + window_days).
    ///
    /// # Returns
    /// - BTreeMap<ShiftId, String>: one message per flagged shift
    ///
    /// Running the scan twice on unchanged state returns identical output.
    #[instrument(skip(self), fields(window_start = %window_start, window_days))]
    pub async fn scan_warnings(
        &self,
        window_start: NaiveDateTime,
        window_days: i64,
    ) -> Result<BTreeMap<ShiftId, String>, Box<dyn Error>> {
        let window_end = window_start + Duration::days(window_days);
        let min_rest_hours = self.config.get_min_rest_hours().await?;

        let shifts = self.repos.shifts.find_starting_in(window_start, window_end)?;

        // Lookup caches for the whole scan window
        let posts: HashMap<PostId, Post> = self
            .repos
            .posts
            .find_all()?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let guards: HashMap<GuardId, Guard> = self
            .repos
            .guards
            .find_all()?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();
        let banned: HashSet<(GuardId, PostId)> = self
            .repos
            .rules
            .find_all_exclusions()?
            .into_iter()
            .map(|e| (e.guard_id, e.post_id))
            .collect();

        let mut warnings: BTreeMap<ShiftId, String> = BTreeMap::new();

        for shift in &shifts {
            let post = match posts.get(&shift.post_id) {
                Some(post) => post,
                None => {
                    // Dangling post reference: skip the shift, keep scanning.
                    warn!(shift_id = shift.id, post_id = shift.post_id, "shift references missing post, skipped");
                    continue;
                }
            };

            // Check 1: under-fill
            if shift.is_understaffed() {
                warnings.insert(
                    shift.id,
                    format!(
                        "{}: understaffed ({}/{})",
                        post.name,
                        shift.assigned.len(),
                        shift.required_count
                    ),
                );
            }

            // Check 2: required commander missing among assigned guards
            if post.requires_commander && !shift.assigned.is_empty() {
                let has_commander = shift
                    .assigned
                    .iter()
                    .any(|id| guards.get(&id).map(|g| g.is_commander).unwrap_or(false));
                if !has_commander {
                    warnings.insert(shift.id, format!("{}: no commander on duty", post.name));
                }
            }

            // Check 3: per assigned guard, post ban
            for guard_id in shift.assigned.iter() {
                let Some(guard) = guards.get(&guard_id) else {
                    warn!(shift_id = shift.id, guard_id, "shift references missing guard, skipped");
                    continue;
                };
                if banned.contains(&(guard_id, shift.post_id)) {
                    warnings.insert(
                        shift.id,
                        format!("Guard {}: not permitted at post {}", guard.name, post.name),
                    );
                }
            }

            // Check 4: per assigned guard, availability blackout
            for guard_id in shift.assigned.iter() {
                let Some(guard) = guards.get(&guard_id) else {
                    continue;
                };
                let overlapping = self.repos.rules.find_availability_overlapping(
                    guard_id,
                    shift.start_time,
                    shift.end_time,
                )?;
                if let Some(constraint) = overlapping.first() {
                    warnings.insert(
                        shift.id,
                        format!("Guard {}: unavailable - {}", guard.name, constraint.reason_text()),
                    );
                }
            }

            // Check 5: per assigned guard, rest violation against the single
            // most recent prior shift
            for guard_id in shift.assigned.iter() {
                let Some(guard) = guards.get(&guard_id) else {
                    continue;
                };
                let prior = self.repos.shifts.find_last_ending_before(
                    guard_id,
                    shift.start_time,
                    Some(shift.id),
                )?;
                if let Some(prior) = prior {
                    let rest_hours = (shift.start_time - prior.end_time).num_seconds() as f64 / 3600.0;
                    if rest_hours < min_rest_hours {
                        let prior_post = posts
                            .get(&prior.post_id)
                            .map(|p| p.name.as_str())
                            .unwrap_or("unknown post");
                        warnings.insert(
                            shift.id,
                            format!(
                                "Rest violation for {}: only {:.1}h since {}",
                                guard.name, rest_hours, prior_post
                            ),
                        );
                    }
                }
            }
        }

        Ok(warnings)
    }
}
