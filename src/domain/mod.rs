// ==========================================
// Duty Roster - domain model layer
// ==========================================
// Responsibility: entities, value types, pure in-memory rules
// Red line: no data access logic, no engine logic
// ==========================================

pub mod guard;
pub mod post;
pub mod rules;
pub mod shift;
pub mod types;

// Re-export core types
pub use guard::Guard;
pub use post::Post;
pub use rules::{AvailabilityConstraint, PairingRule, PostExclusion};
pub use shift::{AssignmentList, Shift};
pub use types::{GuardId, PairingKind, PostId, ShiftId};
