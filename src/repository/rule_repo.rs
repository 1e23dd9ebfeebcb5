// ==========================================
// Duty Roster - policy rule repository
// ==========================================
// Covers the three rule tables: availability_constraints,
// pairing_rules, post_exclusions.
// Red line: no business logic, data access only
// ==========================================

use crate::domain::rules::{AvailabilityConstraint, PairingRule, PostExclusion};
use crate::domain::types::{GuardId, PairingKind, PostId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_dt, parse_dt};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RuleRepository
// ==========================================
pub struct RuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RuleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Availability constraints
    // ==========================================

    fn map_availability(row: &Row<'_>) -> SqliteResult<AvailabilityConstraint> {
        Ok(AvailabilityConstraint {
            id: row.get(0)?,
            guard_id: row.get(1)?,
            start_time: parse_dt(&row.get::<_, String>(2)?),
            end_time: parse_dt(&row.get::<_, String>(3)?),
            reason: row.get(4)?,
        })
    }

    pub fn create_availability(
        &self,
        constraint: &AvailabilityConstraint,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO availability_constraints (guard_id, start_time, end_time, reason)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                constraint.guard_id,
                fmt_dt(constraint.start_time),
                fmt_dt(constraint.end_time),
                constraint.reason,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_all_availability(&self) -> RepositoryResult<Vec<AvailabilityConstraint>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, guard_id, start_time, end_time, reason
            FROM availability_constraints
            ORDER BY guard_id ASC, start_time ASC
            "#,
        )?;
        let constraints = stmt
            .query_map([], Self::map_availability)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(constraints)
    }

    /// Constraints for one guard overlapping [start, end)
    pub fn find_availability_overlapping(
        &self,
        guard_id: GuardId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<AvailabilityConstraint>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, guard_id, start_time, end_time, reason
            FROM availability_constraints
            WHERE guard_id = ?1 AND start_time < ?3 AND end_time > ?2
            ORDER BY start_time ASC
            "#,
        )?;
        let constraints = stmt
            .query_map(
                params![guard_id, fmt_dt(start), fmt_dt(end)],
                Self::map_availability,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(constraints)
    }

    pub fn delete_availability(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM availability_constraints WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    // ==========================================
    // Pairing rules
    // ==========================================

    fn map_pairing(row: &Row<'_>) -> SqliteResult<PairingRule> {
        Ok(PairingRule {
            id: row.get(0)?,
            first_guard_id: row.get(1)?,
            second_guard_id: row.get(2)?,
            kind: PairingKind::from_db_str(&row.get::<_, String>(3)?),
        })
    }

    /// Insert a pairing rule. At most one rule may exist per unordered pair;
    /// the existing rule must be deleted before the kind can change.
    pub fn create_pairing(&self, rule: &PairingRule) -> RepositoryResult<i64> {
        if rule.first_guard_id == rule.second_guard_id {
            return Err(RepositoryError::ValidationError(
                "pairing rule requires two distinct guards".to_string(),
            ));
        }
        let conn = self.get_conn()?;

        let existing: Option<i64> = conn
            .query_row(
                r#"
                SELECT id FROM pairing_rules
                WHERE (first_guard_id = ?1 AND second_guard_id = ?2)
                   OR (first_guard_id = ?2 AND second_guard_id = ?1)
                LIMIT 1
                "#,
                params![rule.first_guard_id, rule.second_guard_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        if existing.is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "pairing rule already exists for guards {} and {}",
                rule.first_guard_id, rule.second_guard_id
            )));
        }

        conn.execute(
            r#"
            INSERT INTO pairing_rules (first_guard_id, second_guard_id, kind)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                rule.first_guard_id,
                rule.second_guard_id,
                rule.kind.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_all_pairing(&self) -> RepositoryResult<Vec<PairingRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, first_guard_id, second_guard_id, kind
            FROM pairing_rules
            ORDER BY id ASC
            "#,
        )?;
        let rules = stmt
            .query_map([], Self::map_pairing)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rules)
    }

    pub fn delete_pairing(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM pairing_rules WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ==========================================
    // Post exclusions
    // ==========================================

    fn map_exclusion(row: &Row<'_>) -> SqliteResult<PostExclusion> {
        Ok(PostExclusion {
            id: row.get(0)?,
            guard_id: row.get(1)?,
            post_id: row.get(2)?,
        })
    }

    /// Insert a post exclusion; duplicates are ignored (the ban is idempotent)
    pub fn create_exclusion(&self, guard_id: GuardId, post_id: PostId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO post_exclusions (guard_id, post_id)
            VALUES (?1, ?2)
            "#,
            params![guard_id, post_id],
        )?;
        Ok(())
    }

    pub fn find_all_exclusions(&self) -> RepositoryResult<Vec<PostExclusion>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, guard_id, post_id
            FROM post_exclusions
            ORDER BY id ASC
            "#,
        )?;
        let exclusions = stmt
            .query_map([], Self::map_exclusion)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(exclusions)
    }

    pub fn exclusion_exists(&self, guard_id: GuardId, post_id: PostId) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT 1 FROM post_exclusions WHERE guard_id = ?1 AND post_id = ?2 LIMIT 1",
            params![guard_id, post_id],
            |_row| Ok(true),
        );
        match result {
            Ok(found) => Ok(found),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lift a ban; removing an absent one is a no-op (like creating a duplicate)
    pub fn delete_exclusion(&self, guard_id: GuardId, post_id: PostId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM post_exclusions WHERE guard_id = ?1 AND post_id = ?2",
            params![guard_id, post_id],
        )?;
        Ok(())
    }
}
