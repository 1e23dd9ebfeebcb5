// ==========================================
// Duty Roster - core library
// ==========================================
// Stack: Rust + SQLite
// System role: decision support for guard duty
// rostering (operators keep final control)
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Importer layer - external data
pub mod importer;

// Config layer - system configuration
pub mod config;

// Database infrastructure (connection init / unified PRAGMA)
pub mod db;

// Logging
pub mod logging;

// API layer - business interface
pub mod api;

// ==========================================
// Re-exports of core types
// ==========================================

// Domain types
pub use domain::types::{GuardId, PairingKind, PostId, ShiftId};

// Domain entities
pub use domain::{
    AssignmentList, AvailabilityConstraint, Guard, PairingRule, Post, PostExclusion, Shift,
};

// Engines
pub use engine::{
    AssignmentEngine, AssignmentOutcome, FairnessLedger, RosterRepositories, RosterScanner,
    SlotGenerator,
};

// API
pub use api::{ApiError, ApiResult, RosterApi};

// ==========================================
// Constants
// ==========================================

// System version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Duty Roster";
