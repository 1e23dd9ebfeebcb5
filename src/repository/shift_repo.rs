// ==========================================
// Duty Roster - shift repository
// ==========================================
// Red line: no business logic, data access only
// Note: assigned_guard_ids is a delimited TEXT column; the LIKE
// prefilter narrows candidate rows, exact membership is re-checked
// in memory via AssignmentList (a LIKE on "1" also matches "11").
// ==========================================

use crate::domain::shift::{AssignmentList, Shift};
use crate::domain::types::{GuardId, PostId, ShiftId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_dt, parse_dt};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ShiftRepository
// ==========================================
/// Manages CRUD and window queries over the shifts table
pub struct ShiftRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Shift> {
        Ok(Shift {
            id: row.get(0)?,
            post_id: row.get(1)?,
            start_time: parse_dt(&row.get::<_, String>(2)?),
            end_time: parse_dt(&row.get::<_, String>(3)?),
            assigned: AssignmentList::from_delimited(&row.get::<_, String>(4)?),
            required_count: row.get::<_, i64>(5)?.max(0) as u32,
        })
    }

    const COLUMNS: &'static str =
        "id, post_id, start_time, end_time, assigned_guard_ids, required_count";

    /// Insert a shift, returning the assigned id
    pub fn create(&self, shift: &Shift) -> RepositoryResult<ShiftId> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shifts (post_id, start_time, end_time, assigned_guard_ids, required_count)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                shift.post_id,
                fmt_dt(shift.start_time),
                fmt_dt(shift.end_time),
                shift.assigned.to_delimited(),
                shift.required_count as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: ShiftId) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM shifts WHERE id = ?1", Self::COLUMNS),
            params![id],
            Self::map_row,
        );
        match result {
            Ok(shift) => Ok(Some(shift)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Shifts starting in [start, end), ordered by start time.
    ///
    /// Both the scanner and the assignment engine iterate windows in this
    /// order; it is load-bearing for first-assigned-wins semantics.
    pub fn find_starting_in(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM shifts
            WHERE start_time >= ?1 AND start_time < ?2
            ORDER BY start_time ASC, id ASC
            "#,
            Self::COLUMNS
        ))?;
        let shifts = stmt
            .query_map(params![fmt_dt(start), fmt_dt(end)], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(shifts)
    }

    /// One shift of a post at an exact start time (slot generator dedup)
    pub fn find_by_post_and_start(
        &self,
        post_id: PostId,
        start: NaiveDateTime,
    ) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!(
                "SELECT {} FROM shifts WHERE post_id = ?1 AND start_time = ?2",
                Self::COLUMNS
            ),
            params![post_id, fmt_dt(start)],
            Self::map_row,
        );
        match result {
            Ok(shift) => Ok(Some(shift)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All shifts with a non-empty assignment list (fairness ledger seed)
    pub fn find_assigned(&self) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shifts WHERE assigned_guard_ids != '' ORDER BY start_time ASC, id ASC",
            Self::COLUMNS
        ))?;
        let shifts = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(shifts)
    }

    /// Shifts containing the given guard in their assignment list
    pub fn find_by_guard(&self, guard_id: GuardId) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM shifts
            WHERE assigned_guard_ids LIKE '%' || ?1 || '%'
            ORDER BY start_time ASC, id ASC
            "#,
            Self::COLUMNS
        ))?;
        let shifts = stmt
            .query_map(params![guard_id.to_string()], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(shifts.into_iter().filter(|s| s.assigned.contains(guard_id)).collect())
    }

    /// The guard's most recent shift ending at or before the given instant.
    ///
    /// # Arguments
    /// - `guard_id`: guard to look up
    /// - `at`: upper bound on end time (inclusive)
    /// - `exclude_shift_id`: shift to ignore (the one being evaluated)
    pub fn find_last_ending_before(
        &self,
        guard_id: GuardId,
        at: NaiveDateTime,
        exclude_shift_id: Option<ShiftId>,
    ) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM shifts
            WHERE end_time <= ?1
              AND assigned_guard_ids LIKE '%' || ?2 || '%'
            ORDER BY end_time DESC, id DESC
            "#,
            Self::COLUMNS
        ))?;
        let candidates = stmt
            .query_map(params![fmt_dt(at), guard_id.to_string()], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(candidates.into_iter().find(|s| {
            s.assigned.contains(guard_id) && Some(s.id) != exclude_shift_id
        }))
    }

    /// Persist a shift's assignment list
    pub fn update_assignments(
        &self,
        id: ShiftId,
        assigned: &AssignmentList,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE shifts SET assigned_guard_ids = ?2 WHERE id = ?1",
            params![id, assigned.to_delimited()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Shift".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Empty assignment lists for shifts starting in [start, end).
    ///
    /// # Returns
    /// - Ok(usize): number of shifts cleared
    pub fn clear_assignments_in(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE shifts SET assigned_guard_ids = ''
            WHERE start_time >= ?1 AND start_time < ?2
            "#,
            params![fmt_dt(start), fmt_dt(end)],
        )?;
        Ok(changed)
    }

    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM shifts", [])?;
        Ok(changed)
    }
}
