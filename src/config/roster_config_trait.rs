// ==========================================
// Duty Roster - configuration reader trait
// ==========================================
// Engines depend on this trait, not on ConfigManager, so tests can
// inject fixed values without a database.
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// Read access to the rostering policy thresholds
#[async_trait]
pub trait RosterConfigReader: Send + Sync {
    /// Minimum rest between two shifts of one guard (hours)
    async fn get_min_rest_hours(&self) -> Result<f64, Box<dyn Error>>;

    /// Night-duty window as (start_hour inclusive, end_hour exclusive);
    /// a shift whose midpoint falls inside is "black"
    async fn get_black_window_hours(&self) -> Result<(u32, u32), Box<dyn Error>>;

    /// How far before the pass window overlapping shifts are considered (hours)
    async fn get_overlap_lookback_hours(&self) -> Result<i64, Box<dyn Error>>;

    /// Rest value reported when a guard has no prior shift on record (hours)
    async fn get_rest_sentinel_hours(&self) -> Result<f64, Box<dyn Error>>;
}
