// ==========================================
// Duty Roster - importer layer
// ==========================================
// Responsibility: bulk intake of external personnel data
// ==========================================

pub mod guard_importer;

pub use guard_importer::{GuardImportSummary, GuardImporter};
