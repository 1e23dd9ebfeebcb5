// ==========================================
// Duty Roster - post repository
// ==========================================
// Red line: no business logic, data access only
// ==========================================

use crate::domain::post::Post;
use crate::domain::types::PostId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Storage format for time-of-day columns
const TIME_FMT: &str = "%H:%M";

fn fmt_time(t: NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

fn parse_time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

// ==========================================
// PostRepository
// ==========================================
/// Manages CRUD over the posts table
pub struct PostRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PostRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Post> {
        Ok(Post {
            id: row.get(0)?,
            name: row.get(1)?,
            shift_minutes: row.get(2)?,
            required_guards: row.get::<_, i64>(3)?.max(0) as u32,
            active_from: parse_time(&row.get::<_, String>(4)?),
            active_to: parse_time(&row.get::<_, String>(5)?),
            boost_from: row.get::<_, Option<String>>(6)?.map(|s| parse_time(&s)),
            boost_to: row.get::<_, Option<String>>(7)?.map(|s| parse_time(&s)),
            boost_guards: row.get::<_, i64>(8)?.max(0) as u32,
            requires_commander: row.get::<_, i64>(9)? != 0,
        })
    }

    const COLUMNS: &'static str = "id, name, shift_minutes, required_guards, active_from, \
         active_to, boost_from, boost_to, boost_guards, requires_commander";

    /// Insert a post, returning the assigned id
    pub fn create(&self, post: &Post) -> RepositoryResult<PostId> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO posts (
                name, shift_minutes, required_guards,
                active_from, active_to,
                boost_from, boost_to, boost_guards,
                requires_commander
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                post.name,
                post.shift_minutes,
                post.required_guards as i64,
                fmt_time(post.active_from),
                fmt_time(post.active_to),
                post.boost_from.map(fmt_time),
                post.boost_to.map(fmt_time),
                post.boost_guards as i64,
                post.requires_commander as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM posts WHERE id = ?1", Self::COLUMNS),
            params![id],
            Self::map_row,
        );
        match result {
            Ok(post) => Ok(Some(post)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_all(&self) -> RepositoryResult<Vec<Post>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts ORDER BY id ASC",
            Self::COLUMNS
        ))?;
        let posts = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(posts)
    }

    /// Delete a post together with its shifts (single transaction)
    pub fn delete_with_shifts(&self, id: PostId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM shifts WHERE post_id = ?1", params![id])?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }
}
