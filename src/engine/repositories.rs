// ==========================================
// Duty Roster - engine repository bundle
// ==========================================
// All repositories share one SQLite connection so that engine reads
// and the end-of-pass commit see a single consistent database.
// ==========================================

use crate::repository::{
    AssignmentRunRepository, GuardRepository, PostRepository, RepositoryResult, RuleRepository,
    ShiftRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Repository bundle handed to the engines
pub struct RosterRepositories {
    pub guards: GuardRepository,
    pub posts: PostRepository,
    pub shifts: ShiftRepository,
    pub rules: RuleRepository,
    pub runs: AssignmentRunRepository,
}

impl RosterRepositories {
    /// Open one shared connection and build every repository over it
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Arc::new(Mutex::new(crate::db::open_sqlite_connection(db_path)?));
        Ok(Self::from_connection(conn))
    }

    /// Build every repository over an existing shared connection
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            guards: GuardRepository::from_connection(conn.clone()),
            posts: PostRepository::from_connection(conn.clone()),
            shifts: ShiftRepository::from_connection(conn.clone()),
            rules: RuleRepository::from_connection(conn.clone()),
            runs: AssignmentRunRepository::from_connection(conn),
        }
    }
}
