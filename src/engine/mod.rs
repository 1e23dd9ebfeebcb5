// ==========================================
// Duty Roster - engine layer
// ==========================================
// Responsibility: business rule engines
// Red line: engines do not build SQL
// ==========================================

pub mod assigner;
pub mod fairness;
pub mod repositories;
pub mod scanner;
pub mod slot_generator;

// Re-export core engines
pub use assigner::{AssignmentEngine, AssignmentOutcome};
pub use fairness::{is_black_shift, FairnessLedger, GuardLoad};
pub use repositories::RosterRepositories;
pub use scanner::RosterScanner;
pub use slot_generator::SlotGenerator;
