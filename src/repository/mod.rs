// ==========================================
// Duty Roster - repository layer
// ==========================================
// Responsibility: data access interfaces shielding database details
// Red line: repositories contain no business logic
// Constraint: all queries are parameterized
// ==========================================

pub mod error;
pub mod guard_repo;
pub mod post_repo;
pub mod rule_repo;
pub mod run_repo;
pub mod shift_repo;

// Re-export core repositories
pub use error::{RepositoryError, RepositoryResult};
pub use guard_repo::GuardRepository;
pub use post_repo::PostRepository;
pub use rule_repo::RuleRepository;
pub use run_repo::{AssignmentRun, AssignmentRunRepository, GuardHoursUpdate, ShiftAssignmentUpdate};
pub use shift_repo::ShiftRepository;

use chrono::NaiveDateTime;

/// Storage format for timestamps.
///
/// Lexicographic order of this form equals chronological order, so SQL
/// range comparisons over the TEXT columns stay correct.
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for storage
pub(crate) fn fmt_dt(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

/// Parse a stored timestamp, falling back to the epoch on corrupt data
pub(crate) fn parse_dt(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, DATETIME_FMT)
        .unwrap_or_else(|_| chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc())
}
