// ==========================================
// Duty Roster - API layer
// ==========================================
// Responsibility: business interface for outer collaborators
// ==========================================

pub mod error;
pub mod roster_api;

pub use error::{ApiError, ApiResult};
pub use roster_api::RosterApi;
