// ==========================================
// Duty Roster - assignment run repository
// ==========================================
// Holds the audit log of assignment passes and the single-transaction
// commit that persists one pass atomically: shift assignment lists,
// cached guard hour counters and the run log row all land together,
// or not at all.
// ==========================================

use crate::domain::shift::AssignmentList;
use crate::domain::types::{GuardId, ShiftId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_dt, parse_dt};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// One assignment pass, as recorded in the assignment_runs audit table
#[derive(Debug, Clone)]
pub struct AssignmentRun {
    pub run_id: String,
    pub window_start: NaiveDateTime,
    pub window_days: i64,
    pub slots_filled: u32,
    pub slots_open: u32,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

/// Pending assignment-list write for one shift
#[derive(Debug, Clone)]
pub struct ShiftAssignmentUpdate {
    pub shift_id: ShiftId,
    pub assigned: AssignmentList,
}

/// Pending cached-hours write for one guard
#[derive(Debug, Clone)]
pub struct GuardHoursUpdate {
    pub guard_id: GuardId,
    pub total_hours: f64,
}

// ==========================================
// AssignmentRunRepository
// ==========================================
pub struct AssignmentRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRunRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<AssignmentRun> {
        Ok(AssignmentRun {
            run_id: row.get(0)?,
            window_start: parse_dt(&row.get::<_, String>(1)?),
            window_days: row.get(2)?,
            slots_filled: row.get::<_, i64>(3)?.max(0) as u32,
            slots_open: row.get::<_, i64>(4)?.max(0) as u32,
            started_at: parse_dt(&row.get::<_, String>(5)?),
            finished_at: parse_dt(&row.get::<_, String>(6)?),
        })
    }

    /// Persist one assignment pass as a single transaction.
    ///
    /// No partial commit is observable: a failure on any statement rolls
    /// back every shift update, every hour counter and the run row.
    pub fn commit_pass(
        &self,
        shift_updates: &[ShiftAssignmentUpdate],
        guard_updates: &[GuardHoursUpdate],
        run: &AssignmentRun,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        for update in shift_updates {
            let changed = tx.execute(
                "UPDATE shifts SET assigned_guard_ids = ?2 WHERE id = ?1",
                params![update.shift_id, update.assigned.to_delimited()],
            )?;
            if changed == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Shift".to_string(),
                    id: update.shift_id.to_string(),
                });
            }
        }

        for update in guard_updates {
            tx.execute(
                "UPDATE guards SET total_hours = ?2 WHERE id = ?1",
                params![update.guard_id, update.total_hours],
            )?;
        }

        tx.execute(
            r#"
            INSERT INTO assignment_runs (
                run_id, window_start, window_days,
                slots_filled, slots_open,
                started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                run.run_id,
                fmt_dt(run.window_start),
                run.window_days,
                run.slots_filled as i64,
                run.slots_open as i64,
                fmt_dt(run.started_at),
                fmt_dt(run.finished_at),
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Most recent runs, newest first
    pub fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<AssignmentRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, window_start, window_days,
                   slots_filled, slots_open,
                   started_at, finished_at
            FROM assignment_runs
            ORDER BY finished_at DESC
            LIMIT ?1
            "#,
        )?;
        let runs = stmt
            .query_map(params![limit], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(runs)
    }
}
