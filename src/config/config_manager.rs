// ==========================================
// Duty Roster - configuration manager
// ==========================================
// Responsibility: configuration loading, queries, overrides
// Storage: config_kv table (key-value)
// ==========================================

use crate::config::roster_config_trait::RosterConfigReader;
use crate::config::{
    DEFAULT_BLACK_WINDOW_END_HOUR, DEFAULT_BLACK_WINDOW_START_HOUR, DEFAULT_MIN_REST_HOURS,
    DEFAULT_OVERLAP_LOOKBACK_HOURS, DEFAULT_REST_SENTINEL_HOURS,
};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Create a ConfigManager over an existing connection.
    ///
    /// The unified PRAGMA set is re-applied to the passed connection
    /// (idempotent) so behavior stays consistent.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("lock acquisition failed: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// Read a raw config value
    ///
    /// # Returns
    /// - Some(String): stored value
    /// - None: key absent
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Write a config value (upsert)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Read a typed value, falling back to the default on absence or
    /// parse failure (a malformed row must not poison a pass)
    fn get_parsed_or<T: FromStr + Copy>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|raw| raw.trim().parse::<T>().ok())
            .unwrap_or(default))
    }
}

#[async_trait]
impl RosterConfigReader for ConfigManager {
    async fn get_min_rest_hours(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or("min_rest_hours", DEFAULT_MIN_REST_HOURS)
    }

    async fn get_black_window_hours(&self) -> Result<(u32, u32), Box<dyn Error>> {
        let start =
            self.get_parsed_or("black_window_start_hour", DEFAULT_BLACK_WINDOW_START_HOUR)?;
        let end = self.get_parsed_or("black_window_end_hour", DEFAULT_BLACK_WINDOW_END_HOUR)?;
        Ok((start.min(23), end.min(24)))
    }

    async fn get_overlap_lookback_hours(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or("overlap_lookback_hours", DEFAULT_OVERLAP_LOOKBACK_HOURS)
    }

    async fn get_rest_sentinel_hours(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or("rest_sentinel_hours", DEFAULT_REST_SENTINEL_HOURS)
    }
}
