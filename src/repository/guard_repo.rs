// ==========================================
// Duty Roster - guard repository
// ==========================================
// Red line: no business logic, data access only
// ==========================================

use crate::domain::guard::Guard;
use crate::domain::types::GuardId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// GuardRepository
// ==========================================
/// Manages CRUD over the guards table
pub struct GuardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GuardRepository {
    /// Create a repository sharing an existing connection
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Guard> {
        Ok(Guard {
            id: row.get(0)?,
            name: row.get(1)?,
            is_commander: row.get::<_, i64>(2)? != 0,
            total_hours: row.get(3)?,
        })
    }

    /// Insert a guard, returning the assigned id
    pub fn create(&self, guard: &Guard) -> RepositoryResult<GuardId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO guards (name, is_commander, total_hours) VALUES (?1, ?2, ?3)",
            params![guard.name, guard.is_commander as i64, guard.total_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: GuardId) -> RepositoryResult<Option<Guard>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT id, name, is_commander, total_hours FROM guards WHERE id = ?1",
            params![id],
            Self::map_row,
        );
        match result {
            Ok(guard) => Ok(Some(guard)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Guard>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT id, name, is_commander, total_hours FROM guards WHERE name = ?1",
            params![name],
            Self::map_row,
        );
        match result {
            Ok(guard) => Ok(Some(guard)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All guards, ordered by id (stable iteration order for the engine)
    pub fn find_all(&self) -> RepositoryResult<Vec<Guard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, is_commander, total_hours FROM guards ORDER BY id ASC",
        )?;
        let guards = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(guards)
    }

    /// Overwrite the cached hour counter
    pub fn update_total_hours(&self, id: GuardId, total_hours: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE guards SET total_hours = ?2 WHERE id = ?1",
            params![id, total_hours],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Guard".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Reset every cached hour counter to zero
    pub fn reset_all_hours(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute("UPDATE guards SET total_hours = 0.0", [])?;
        Ok(changed)
    }

    pub fn delete(&self, id: GuardId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM guards WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Bulk insert by name, skipping names that already exist.
    ///
    /// # Returns
    /// - Ok(usize): number of guards actually inserted
    pub fn bulk_insert_names(&self, names: &[(String, bool)]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (name, is_commander) in names {
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO guards (name, is_commander, total_hours) VALUES (?1, ?2, 0.0)",
                params![name, *is_commander as i64],
            )?;
            count += inserted;
        }

        tx.commit()?;
        Ok(count)
    }
}
