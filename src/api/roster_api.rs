// ==========================================
// Duty Roster - roster API facade
// ==========================================
// The surface an editor/UI collaborator talks to. Thin delegation to
// the engines and repositories; input validation happens here so the
// engines can assume well-formed windows.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::rules::{AvailabilityConstraint, PairingRule};
use crate::domain::types::{GuardId, PairingKind, PostId, ShiftId};
use crate::domain::{Guard, Post};
use crate::engine::{
    AssignmentEngine, AssignmentOutcome, RosterRepositories, RosterScanner, SlotGenerator,
};
use crate::importer::{GuardImportSummary, GuardImporter};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

// ==========================================
// RosterApi
// ==========================================
pub struct RosterApi {
    repos: Arc<RosterRepositories>,
    config: Arc<ConfigManager>,
}

impl RosterApi {
    /// Open the API over a database file; creates the schema when absent.
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let conn = Arc::new(std::sync::Mutex::new(conn));
        let repos = Arc::new(RosterRepositories::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| ApiError::Internal(e.to_string()))?,
        );
        Ok(Self { repos, config })
    }

    pub fn from_parts(repos: Arc<RosterRepositories>, config: Arc<ConfigManager>) -> Self {
        Self { repos, config }
    }

    fn validate_window(window_days: i64) -> ApiResult<()> {
        if window_days < 1 {
            return Err(ApiError::InvalidInput(format!(
                "window_days must be >= 1, got {}",
                window_days
            )));
        }
        Ok(())
    }

    // ==========================================
    // Core operations
    // ==========================================

    /// Run one assignment pass over the window. Mutates the store and
    /// leaves it ready for display; the outcome is informational.
    pub async fn run_assignment(
        &self,
        window_start: NaiveDateTime,
        window_days: i64,
    ) -> ApiResult<AssignmentOutcome> {
        Self::validate_window(window_days)?;
        let engine = AssignmentEngine::new(self.repos.clone(), self.config.clone());
        Ok(engine.run_assignment(window_start, window_days).await?)
    }

    /// Scan the window for policy violations: one message per flagged shift.
    pub async fn scan_warnings(
        &self,
        window_start: NaiveDateTime,
        window_days: i64,
    ) -> ApiResult<BTreeMap<ShiftId, String>> {
        Self::validate_window(window_days)?;
        let scanner = RosterScanner::new(self.repos.clone(), self.config.clone());
        Ok(scanner.scan_warnings(window_start, window_days).await?)
    }

    /// Empty assignment lists for shifts starting in the window.
    ///
    /// Cached guard hour counters are left untouched; they are display
    /// figures re-derived from history on the next pass.
    pub fn clear_assignments(
        &self,
        window_start: NaiveDateTime,
        window_days: i64,
    ) -> ApiResult<usize> {
        Self::validate_window(window_days)?;
        let window_end = window_start + chrono::Duration::days(window_days);
        Ok(self.repos.shifts.clear_assignments_in(window_start, window_end)?)
    }

    /// Pre-create the day's empty shifts from each post's activity windows.
    pub fn generate_slots(&self, day: NaiveDate) -> ApiResult<usize> {
        let generator = SlotGenerator::new(self.repos.clone());
        Ok(generator.generate_for_day(day)?)
    }

    // ==========================================
    // Personnel and policy management
    // ==========================================

    pub fn add_guard(&self, name: &str, is_commander: bool) -> ApiResult<GuardId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("guard name must not be empty".to_string()));
        }
        Ok(self.repos.guards.create(&Guard::new(name, is_commander))?)
    }

    pub fn add_post(&self, post: &Post) -> ApiResult<PostId> {
        if post.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("post name must not be empty".to_string()));
        }
        if post.shift_minutes <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "shift length must be positive, got {} minutes",
                post.shift_minutes
            )));
        }
        Ok(self.repos.posts.create(post)?)
    }

    pub fn add_availability_constraint(
        &self,
        guard_id: GuardId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        reason: Option<String>,
    ) -> ApiResult<i64> {
        if end <= start {
            return Err(ApiError::InvalidInput(
                "constraint end must be after its start".to_string(),
            ));
        }
        let constraint = AvailabilityConstraint {
            id: 0,
            guard_id,
            start_time: start,
            end_time: end,
            reason,
        };
        Ok(self.repos.rules.create_availability(&constraint)?)
    }

    pub fn add_pairing_rule(
        &self,
        first_guard_id: GuardId,
        second_guard_id: GuardId,
        kind: PairingKind,
    ) -> ApiResult<i64> {
        let rule = PairingRule {
            id: 0,
            first_guard_id,
            second_guard_id,
            kind,
        };
        Ok(self.repos.rules.create_pairing(&rule)?)
    }

    pub fn add_post_exclusion(&self, guard_id: GuardId, post_id: PostId) -> ApiResult<()> {
        Ok(self.repos.rules.create_exclusion(guard_id, post_id)?)
    }

    /// Remove a guard. Stale ids left in assignment lists are skipped by
    /// the scanner and the engine.
    pub fn remove_guard(&self, guard_id: GuardId) -> ApiResult<()> {
        Ok(self.repos.guards.delete(guard_id)?)
    }

    /// Remove a post together with all of its shifts
    pub fn remove_post(&self, post_id: PostId) -> ApiResult<()> {
        Ok(self.repos.posts.delete_with_shifts(post_id)?)
    }

    pub fn remove_availability_constraint(&self, constraint_id: i64) -> ApiResult<()> {
        Ok(self.repos.rules.delete_availability(constraint_id)?)
    }

    /// Remove a pairing rule; the only way to change a pair's kind
    pub fn remove_pairing_rule(&self, rule_id: i64) -> ApiResult<()> {
        Ok(self.repos.rules.delete_pairing(rule_id)?)
    }

    pub fn remove_post_exclusion(&self, guard_id: GuardId, post_id: PostId) -> ApiResult<()> {
        Ok(self.repos.rules.delete_exclusion(guard_id, post_id)?)
    }

    /// Delete every shift ("danger zone": wipes the whole board)
    pub fn purge_shifts(&self) -> ApiResult<usize> {
        Ok(self.repos.shifts.delete_all()?)
    }

    /// Reset every cached guard hour counter to zero ("danger zone" reset)
    pub fn reset_guard_hours(&self) -> ApiResult<usize> {
        Ok(self.repos.guards.reset_all_hours()?)
    }

    /// Bulk import guards from a CSV file
    pub fn import_guards(&self, path: impl AsRef<Path>) -> ApiResult<GuardImportSummary> {
        let importer = GuardImporter::new(self.repos.clone());
        Ok(importer.import_from_path(path)?)
    }

    /// Direct repository access for callers composing richer queries
    pub fn repositories(&self) -> Arc<RosterRepositories> {
        self.repos.clone()
    }
}
