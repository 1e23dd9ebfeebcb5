// ==========================================
// Duty Roster - guard CSV importer
// ==========================================
// Bulk-add of personnel. Expected columns: "name" (required) and
// "commander" (optional truthy flag: 1/true/yes). Names already present
// are skipped, so re-importing the same file is harmless.
// ==========================================

use crate::engine::RosterRepositories;
use csv::ReaderBuilder;
use std::error::Error;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of one bulk import
#[derive(Debug, Clone, Default)]
pub struct GuardImportSummary {
    pub rows_read: usize,
    pub imported: usize,
    pub skipped: usize,
}

// ==========================================
// GuardImporter
// ==========================================
pub struct GuardImporter {
    repos: Arc<RosterRepositories>,
}

impl GuardImporter {
    pub fn new(repos: Arc<RosterRepositories>) -> Self {
        Self { repos }
    }

    /// Import guards from a CSV file on disk
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn import_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<GuardImportSummary, Box<dyn Error>> {
        let file = std::fs::File::open(path)?;
        self.import_from_reader(file)
    }

    /// Import guards from any CSV source
    pub fn import_from_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<GuardImportSummary, Box<dyn Error>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let name_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("name"))
            .ok_or("CSV is missing the required 'name' column")?;
        let commander_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("commander"));

        let mut rows: Vec<(String, bool)> = Vec::new();
        let mut summary = GuardImportSummary::default();

        for record in csv_reader.records() {
            let record = record?;
            summary.rows_read += 1;

            let name = record.get(name_idx).unwrap_or("").trim();
            if name.is_empty() {
                summary.skipped += 1;
                continue;
            }
            let is_commander = commander_idx
                .and_then(|idx| record.get(idx))
                .map(is_truthy)
                .unwrap_or(false);
            rows.push((name.to_string(), is_commander));
        }

        summary.imported = self.repos.guards.bulk_insert_names(&rows)?;
        summary.skipped += rows.len() - summary.imported;

        info!(
            rows_read = summary.rows_read,
            imported = summary.imported,
            skipped = summary.skipped,
            "guard import finished"
        );
        Ok(summary)
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
