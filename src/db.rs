// ==========================================
// Duty Roster - SQLite connection init
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so foreign keys
//   are not enabled in some modules and silently off in others
// - unified busy_timeout to avoid sporadic busy errors on concurrent writes
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a SQLite connection
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// applied to every connection the process opens.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all tables and indexes, and seed configuration defaults.
///
/// Idempotent: every statement is IF NOT EXISTS / OR IGNORE, so it is safe
/// to run on every startup and on existing databases.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS guards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            is_commander INTEGER NOT NULL DEFAULT 0,
            total_hours REAL NOT NULL DEFAULT 0.0
        );

        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            shift_minutes INTEGER NOT NULL DEFAULT 120,
            required_guards INTEGER NOT NULL DEFAULT 1,
            active_from TEXT NOT NULL DEFAULT '00:00',
            active_to TEXT NOT NULL DEFAULT '23:59',
            boost_from TEXT,
            boost_to TEXT,
            boost_guards INTEGER NOT NULL DEFAULT 0,
            requires_commander INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            assigned_guard_ids TEXT NOT NULL DEFAULT '',
            required_count INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_shifts_start_time ON shifts(start_time);
        CREATE INDEX IF NOT EXISTS idx_shifts_end_time ON shifts(end_time);
        CREATE INDEX IF NOT EXISTS idx_shifts_post_start ON shifts(post_id, start_time);

        CREATE TABLE IF NOT EXISTS availability_constraints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guard_id INTEGER NOT NULL REFERENCES guards(id) ON DELETE CASCADE,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            reason TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_availability_guard ON availability_constraints(guard_id);

        CREATE TABLE IF NOT EXISTS pairing_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_guard_id INTEGER NOT NULL REFERENCES guards(id) ON DELETE CASCADE,
            second_guard_id INTEGER NOT NULL REFERENCES guards(id) ON DELETE CASCADE,
            kind TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS post_exclusions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guard_id INTEGER NOT NULL REFERENCES guards(id) ON DELETE CASCADE,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            UNIQUE(guard_id, post_id)
        );

        CREATE TABLE IF NOT EXISTS assignment_runs (
            run_id TEXT PRIMARY KEY,
            window_start TEXT NOT NULL,
            window_days INTEGER NOT NULL,
            slots_filled INTEGER NOT NULL,
            slots_open INTEGER NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // Seed configuration defaults (existing values win)
    conn.execute_batch(
        r#"
        INSERT OR IGNORE INTO config_kv (key, value) VALUES ('min_rest_hours', '6');
        INSERT OR IGNORE INTO config_kv (key, value) VALUES ('black_window_start_hour', '0');
        INSERT OR IGNORE INTO config_kv (key, value) VALUES ('black_window_end_hour', '6');
        INSERT OR IGNORE INTO config_kv (key, value) VALUES ('overlap_lookback_hours', '24');
        INSERT OR IGNORE INTO config_kv (key, value) VALUES ('rest_sentinel_hours', '999');
        "#,
    )?;

    Ok(())
}
