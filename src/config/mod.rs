// ==========================================
// Duty Roster - configuration layer
// ==========================================
// Responsibility: policy threshold loading and queries
// Storage: config_kv table (key-value)
// ==========================================

pub mod config_manager;
pub mod roster_config_trait;

pub use config_manager::ConfigManager;
pub use roster_config_trait::RosterConfigReader;

// ==========================================
// Policy defaults (used when a key is absent or unparseable)
// ==========================================

/// Minimum rest between two shifts of one guard (hours)
pub const DEFAULT_MIN_REST_HOURS: f64 = 6.0;

/// Night-duty ("black") window start hour, inclusive
pub const DEFAULT_BLACK_WINDOW_START_HOUR: u32 = 0;

/// Night-duty ("black") window end hour, exclusive
pub const DEFAULT_BLACK_WINDOW_END_HOUR: u32 = 6;

/// How far before the pass window overlapping shifts are considered (hours)
pub const DEFAULT_OVERLAP_LOOKBACK_HOURS: i64 = 24;

/// Rest value used when a guard has no prior shift on record (hours)
pub const DEFAULT_REST_SENTINEL_HOURS: f64 = 999.0;
