// ==========================================
// Duty Roster - assignment engine
// ==========================================
// Constraint-aware greedy filler: processes the window's shifts in
// start order and fills each open slot with the best-ranked eligible
// guard. Single pass, no backtracking; a guard placed on an earlier
// shift is simply unavailable for a later overlapping one
// (first-assigned-wins). A slot with no eligible candidate stays open
// and is surfaced later by the scanner as under-fill.
// ==========================================
// Responsibility: mutate assignment lists and guard hour counters,
// committed as one transaction at the end of the pass
// Red line: engines do not build SQL
// ==========================================

use crate::config::RosterConfigReader;
use crate::domain::guard::Guard;
use crate::domain::rules::AvailabilityConstraint;
use crate::domain::shift::Shift;
use crate::domain::types::{GuardId, PairingKind, PostId, ShiftId};
use crate::engine::fairness::FairnessLedger;
use crate::engine::RosterRepositories;
use crate::repository::{AssignmentRun, GuardHoursUpdate, ShiftAssignmentUpdate};
use chrono::{Duration, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of one assignment pass
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub run_id: String,
    pub slots_filled: u32,
    pub slots_open: u32,
}

/// Ranking inputs for one eligible guard
#[derive(Debug, Clone)]
struct Candidate {
    guard_id: GuardId,
    /// Hours since the guard's most recent prior shift (sentinel when none)
    rest: f64,
    /// Count of current occupants bound to the candidate by MUST_PAIR
    buddy_score: u32,
    /// 1 iff the post wants a commander, has none yet, and this is one
    cmd_priority: u32,
    /// Black-shift count, active only when the shift being filled is black
    black_key: u32,
    /// Hours already assigned inside the pass window
    daily: f64,
    /// Lifetime assigned hours
    total: f64,
}

impl Candidate {
    /// Ascending rank order; the lowest-sorting candidate wins the slot.
    ///
    /// Keys, in order: rested-below-threshold flag, commander priority
    /// (desc), buddy score (desc), conditional black-shift count, window
    /// hours, lifetime hours, rest (desc: among otherwise-equal candidates
    /// the least-rested wins), and finally guard id for a stable outcome
    /// independent of input iteration order.
    fn rank(&self, other: &Self, min_rest_hours: f64) -> Ordering {
        (self.rest < min_rest_hours)
            .cmp(&(other.rest < min_rest_hours))
            .then(other.cmd_priority.cmp(&self.cmd_priority))
            .then(other.buddy_score.cmp(&self.buddy_score))
            .then(self.black_key.cmp(&other.black_key))
            .then(self.daily.total_cmp(&other.daily))
            .then(self.total.total_cmp(&other.total))
            .then(other.rest.total_cmp(&self.rest))
            .then(self.guard_id.cmp(&other.guard_id))
    }
}

/// Known shift interval of one guard, tracked across the pass
#[derive(Debug, Clone, Copy)]
struct Interval {
    shift_id: ShiftId,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

// ==========================================
// AssignmentEngine
// ==========================================
pub struct AssignmentEngine<C>
where
    C: RosterConfigReader,
{
    repos: Arc<RosterRepositories>,
    config: Arc<C>,
}

impl<C> AssignmentEngine<C>
where
    C: RosterConfigReader,
{
    pub fn new(repos: Arc<RosterRepositories>, config: Arc<C>) -> Self {
        Self { repos, config }
    }

    /// Fill every under-staffed shift starting in
    /// [window_start, window_start + window_days).
    ///
    /// Mutations (assignment lists, cached guard hours, run log) are
    /// committed as one transaction at the end; a store failure aborts
    /// the whole pass with nothing persisted. No per-slot retries.
    #[instrument(skip(self), fields(window_start = %window_start, window_days))]
    pub async fn run_assignment(
        &self,
        window_start: NaiveDateTime,
        window_days: i64,
    ) -> Result<AssignmentOutcome, Box<dyn Error>> {
        let started_at = Utc::now().naive_utc();
        let window_end = window_start + Duration::days(window_days);

        let min_rest_hours = self.config.get_min_rest_hours().await?;
        let lookback_hours = self.config.get_overlap_lookback_hours().await?;
        let (black_start, black_end) = self.config.get_black_window_hours().await?;
        let rest_sentinel = self.config.get_rest_sentinel_hours().await?;

        let guards = self.repos.guards.find_all()?;
        let posts: HashMap<PostId, bool> = self
            .repos
            .posts
            .find_all()?
            .into_iter()
            .map(|p| (p.id, p.requires_commander))
            .collect();

        // Fairness ledger seeded from the full assignment history
        let history = self.repos.shifts.find_assigned()?;
        let mut ledger =
            FairnessLedger::seed(&history, window_start, window_end, black_start, black_end);

        // Symmetric pairing lookup and ban set
        let mut pairing: HashMap<(GuardId, GuardId), PairingKind> = HashMap::new();
        for rule in self.repos.rules.find_all_pairing()? {
            pairing.insert((rule.first_guard_id, rule.second_guard_id), rule.kind);
            pairing.insert((rule.second_guard_id, rule.first_guard_id), rule.kind);
        }
        let banned: HashSet<(GuardId, PostId)> = self
            .repos
            .rules
            .find_all_exclusions()?
            .into_iter()
            .map(|e| (e.guard_id, e.post_id))
            .collect();

        // Availability blackouts, grouped per guard
        let mut blackouts: HashMap<GuardId, Vec<AvailabilityConstraint>> = HashMap::new();
        for c in self.repos.rules.find_all_availability()? {
            blackouts.entry(c.guard_id).or_default().push(c);
        }

        // Known shift intervals per guard over the lookback span; extended
        // in-pass so an earlier assignment blocks a later overlapping one.
        let lookback_start = window_start - Duration::hours(lookback_hours);
        let mut intervals: HashMap<GuardId, Vec<Interval>> = HashMap::new();
        for shift in self.repos.shifts.find_starting_in(lookback_start, window_end)? {
            for guard_id in shift.assigned.iter() {
                intervals.entry(guard_id).or_default().push(Interval {
                    shift_id: shift.id,
                    start: shift.start_time,
                    end: shift.end_time,
                });
            }
        }

        let mut cached_hours: HashMap<GuardId, f64> =
            guards.iter().map(|g| (g.id, g.total_hours)).collect();
        let mut dirty_guards: HashSet<GuardId> = HashSet::new();

        let mut shift_updates: Vec<ShiftAssignmentUpdate> = Vec::new();
        let mut slots_filled: u32 = 0;
        let mut slots_open: u32 = 0;

        let window_shifts = self.repos.shifts.find_starting_in(window_start, window_end)?;
        for mut shift in window_shifts {
            let Some(&requires_commander) = posts.get(&shift.post_id) else {
                warn!(shift_id = shift.id, post_id = shift.post_id, "shift references missing post, skipped");
                continue;
            };

            let needed = shift.open_slots();
            if needed == 0 {
                continue;
            }
            let shift_is_black = ledger.is_black(&shift);
            let mut changed = false;

            for _ in 0..needed {
                let chosen = self.pick_candidate(
                    &guards,
                    &shift,
                    requires_commander,
                    shift_is_black,
                    &ledger,
                    &pairing,
                    &banned,
                    &blackouts,
                    &intervals,
                    min_rest_hours,
                    rest_sentinel,
                );

                match chosen {
                    Some(guard_id) => {
                        shift.assigned.push(guard_id);
                        ledger.record_assignment(guard_id, &shift);
                        *cached_hours.entry(guard_id).or_insert(0.0) +=
                            shift.duration_hours();
                        dirty_guards.insert(guard_id);
                        intervals.entry(guard_id).or_default().push(Interval {
                            shift_id: shift.id,
                            start: shift.start_time,
                            end: shift.end_time,
                        });
                        slots_filled += 1;
                        changed = true;
                        debug!(shift_id = shift.id, guard_id, "slot filled");
                    }
                    None => {
                        // Normal outcome, not an error: the scanner will
                        // report the shift as understaffed.
                        slots_open += 1;
                        debug!(shift_id = shift.id, "no eligible candidate, slot left open");
                    }
                }
            }

            if changed {
                shift_updates.push(ShiftAssignmentUpdate {
                    shift_id: shift.id,
                    assigned: shift.assigned.clone(),
                });
            }
        }

        let guard_updates: Vec<GuardHoursUpdate> = dirty_guards
            .iter()
            .map(|&guard_id| GuardHoursUpdate {
                guard_id,
                total_hours: cached_hours.get(&guard_id).copied().unwrap_or(0.0),
            })
            .collect();

        let run = AssignmentRun {
            run_id: Uuid::new_v4().to_string(),
            window_start,
            window_days,
            slots_filled,
            slots_open,
            started_at,
            finished_at: Utc::now().naive_utc(),
        };

        self.repos.runs.commit_pass(&shift_updates, &guard_updates, &run)?;

        info!(
            run_id = %run.run_id,
            slots_filled,
            slots_open,
            "assignment pass committed"
        );

        Ok(AssignmentOutcome {
            run_id: run.run_id,
            slots_filled,
            slots_open,
        })
    }

    /// Eligibility filter + ranking for one open slot.
    #[allow(clippy::too_many_arguments)]
    fn pick_candidate(
        &self,
        guards: &[Guard],
        shift: &Shift,
        requires_commander: bool,
        shift_is_black: bool,
        ledger: &FairnessLedger,
        pairing: &HashMap<(GuardId, GuardId), PairingKind>,
        banned: &HashSet<(GuardId, PostId)>,
        blackouts: &HashMap<GuardId, Vec<AvailabilityConstraint>>,
        intervals: &HashMap<GuardId, Vec<Interval>>,
        min_rest_hours: f64,
        rest_sentinel: f64,
    ) -> Option<GuardId> {
        let commander_present = guards
            .iter()
            .any(|g| g.is_commander && shift.assigned.contains(g.id));

        let mut best: Option<Candidate> = None;

        'guards: for guard in guards {
            if shift.assigned.contains(guard.id) {
                continue;
            }
            if banned.contains(&(guard.id, shift.post_id)) {
                continue;
            }

            let own_intervals = intervals.get(&guard.id).map(Vec::as_slice).unwrap_or(&[]);

            // Double-booking on an overlapping shift
            for iv in own_intervals {
                if iv.shift_id != shift.id
                    && shift.start_time.max(iv.start) < shift.end_time.min(iv.end)
                {
                    continue 'guards;
                }
            }

            // Availability blackout
            if let Some(constraints) = blackouts.get(&guard.id) {
                if constraints
                    .iter()
                    .any(|c| c.overlaps(shift.start_time, shift.end_time))
                {
                    continue;
                }
            }

            // Pairing rules against current occupants
            let mut buddy_score: u32 = 0;
            for occupant in shift.assigned.iter() {
                match pairing.get(&(guard.id, occupant)) {
                    Some(PairingKind::MustNotPair) => continue 'guards,
                    Some(PairingKind::MustPair) => buddy_score += 1,
                    None => {}
                }
            }

            // Rest since the most recent prior shift
            let rest = own_intervals
                .iter()
                .filter(|iv| iv.shift_id != shift.id && iv.end <= shift.start_time)
                .map(|iv| iv.end)
                .max()
                .map(|end| (shift.start_time - end).num_seconds() as f64 / 3600.0)
                .unwrap_or(rest_sentinel);

            let load = ledger.load(guard.id);
            let candidate = Candidate {
                guard_id: guard.id,
                rest,
                buddy_score,
                cmd_priority: u32::from(
                    requires_commander && !commander_present && guard.is_commander,
                ),
                black_key: if shift_is_black { load.black_shifts } else { 0 },
                daily: load.window_hours,
                total: load.total_hours,
            };

            best = match best {
                None => Some(candidate),
                Some(current) => {
                    if candidate.rank(&current, min_rest_hours) == Ordering::Less {
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        best.map(|c| c.guard_id)
    }
}
