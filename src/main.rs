// ==========================================
// Duty Roster - CLI entry point
// ==========================================
// Thin command surface over the RosterApi facade.
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use duty_roster::domain::types::PairingKind;
use duty_roster::domain::Post;
use duty_roster::{logging, RosterApi};

#[derive(Parser)]
#[command(name = "duty-roster", version, about = "Guard duty rostering")]
struct Cli {
    /// Database file path
    #[arg(long, default_value = "duty_roster.db")]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum PairingKindArg {
    MustPair,
    MustNotPair,
}

impl From<PairingKindArg> for PairingKind {
    fn from(arg: PairingKindArg) -> Self {
        match arg {
            PairingKindArg::MustPair => PairingKind::MustPair,
            PairingKindArg::MustNotPair => PairingKind::MustNotPair,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema (idempotent)
    Init,

    /// Add a guard
    AddGuard {
        #[arg(long)]
        name: String,
        /// Mark the guard as a commander
        #[arg(long)]
        commander: bool,
    },

    /// Add a post
    AddPost {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 120)]
        shift_minutes: i64,
        #[arg(long, default_value_t = 1)]
        required_guards: u32,
        /// Activity window start, e.g. 06:00:00
        #[arg(long, default_value = "00:00:00")]
        active_from: NaiveTime,
        /// Activity window end (may be before start to wrap midnight)
        #[arg(long, default_value = "23:59:59")]
        active_to: NaiveTime,
        #[arg(long)]
        boost_from: Option<NaiveTime>,
        #[arg(long)]
        boost_to: Option<NaiveTime>,
        #[arg(long, default_value_t = 0)]
        boost_guards: u32,
        /// Require a commander among the assigned guards
        #[arg(long)]
        requires_commander: bool,
    },

    /// Add an availability blackout for a guard
    AddConstraint {
        #[arg(long)]
        guard_id: i64,
        /// Blackout start, e.g. "2026-08-28T08:00:00"
        #[arg(long)]
        start: chrono::NaiveDateTime,
        #[arg(long)]
        end: chrono::NaiveDateTime,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Add a pairing rule between two guards
    AddPairing {
        #[arg(long)]
        first: i64,
        #[arg(long)]
        second: i64,
        #[arg(long, value_enum)]
        kind: PairingKindArg,
    },

    /// Ban a guard from a post
    AddExclusion {
        #[arg(long)]
        guard_id: i64,
        #[arg(long)]
        post_id: i64,
    },

    /// Remove a guard
    RemoveGuard {
        #[arg(long)]
        guard_id: i64,
    },

    /// Remove a post together with all of its shifts
    RemovePost {
        #[arg(long)]
        post_id: i64,
    },

    /// Remove an availability blackout by id
    RemoveConstraint {
        #[arg(long)]
        id: i64,
    },

    /// Remove a pairing rule by id (required before changing its kind)
    RemovePairing {
        #[arg(long)]
        id: i64,
    },

    /// Lift a guard's ban from a post
    RemoveExclusion {
        #[arg(long)]
        guard_id: i64,
        #[arg(long)]
        post_id: i64,
    },

    /// Bulk import guards from a CSV file (columns: name[, commander])
    ImportGuards {
        #[arg(long)]
        file: String,
    },

    /// Pre-create a day's empty shifts from post activity windows
    GenerateSlots {
        #[arg(long)]
        date: NaiveDate,
    },

    /// Run an assignment pass over a window
    Assign {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, default_value_t = 1)]
        days: i64,
    },

    /// Scan a window for policy violations
    Scan {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, default_value_t = 1)]
        days: i64,
    },

    /// Empty assignment lists for shifts in a window
    Clear {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, default_value_t = 1)]
        days: i64,
    },

    /// Reset every cached guard hour counter to zero
    ResetHours,

    /// Delete every shift (irreversible)
    PurgeShifts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let api = RosterApi::open(&cli.db)?;

    match cli.command {
        Command::Init => {
            // RosterApi::open already created the schema
            println!("database ready: {}", cli.db);
        }
        Command::AddGuard { name, commander } => {
            let id = api.add_guard(&name, commander)?;
            println!("guard {} created with id {}", name, id);
        }
        Command::AddPost {
            name,
            shift_minutes,
            required_guards,
            active_from,
            active_to,
            boost_from,
            boost_to,
            boost_guards,
            requires_commander,
        } => {
            let post = Post {
                id: 0,
                name: name.clone(),
                shift_minutes,
                required_guards,
                active_from,
                active_to,
                boost_from,
                boost_to,
                boost_guards,
                requires_commander,
            };
            let id = api.add_post(&post)?;
            println!("post {} created with id {}", name, id);
        }
        Command::AddConstraint {
            guard_id,
            start,
            end,
            reason,
        } => {
            let id = api.add_availability_constraint(guard_id, start, end, reason)?;
            println!("constraint {} created", id);
        }
        Command::AddPairing { first, second, kind } => {
            let id = api.add_pairing_rule(first, second, kind.into())?;
            println!("pairing rule {} created", id);
        }
        Command::AddExclusion { guard_id, post_id } => {
            api.add_post_exclusion(guard_id, post_id)?;
            println!("guard {} banned from post {}", guard_id, post_id);
        }
        Command::RemoveGuard { guard_id } => {
            api.remove_guard(guard_id)?;
            println!("guard {} removed", guard_id);
        }
        Command::RemovePost { post_id } => {
            api.remove_post(post_id)?;
            println!("post {} removed with its shifts", post_id);
        }
        Command::RemoveConstraint { id } => {
            api.remove_availability_constraint(id)?;
            println!("constraint {} removed", id);
        }
        Command::RemovePairing { id } => {
            api.remove_pairing_rule(id)?;
            println!("pairing rule {} removed", id);
        }
        Command::RemoveExclusion { guard_id, post_id } => {
            api.remove_post_exclusion(guard_id, post_id)?;
            println!("guard {} allowed at post {} again", guard_id, post_id);
        }
        Command::ImportGuards { file } => {
            let summary = api.import_guards(&file)?;
            println!(
                "read {} rows: {} imported, {} skipped",
                summary.rows_read, summary.imported, summary.skipped
            );
        }
        Command::GenerateSlots { date } => {
            let created = api.generate_slots(date)?;
            println!("{} shifts created for {}", created, date);
        }
        Command::Assign { start, days } => {
            let window_start = start.and_hms_opt(0, 0, 0).expect("midnight is always valid");
            let outcome = api.run_assignment(window_start, days).await?;
            println!(
                "run {}: {} slots filled, {} left open",
                outcome.run_id, outcome.slots_filled, outcome.slots_open
            );
        }
        Command::Scan { start, days } => {
            let window_start = start.and_hms_opt(0, 0, 0).expect("midnight is always valid");
            let warnings = api.scan_warnings(window_start, days).await?;
            if warnings.is_empty() {
                println!("no warnings");
            } else {
                for (shift_id, message) in &warnings {
                    println!("shift {}: {}", shift_id, message);
                }
            }
        }
        Command::Clear { start, days } => {
            let window_start = start.and_hms_opt(0, 0, 0).expect("midnight is always valid");
            let cleared = api.clear_assignments(window_start, days)?;
            println!("{} shifts cleared", cleared);
        }
        Command::ResetHours => {
            let reset = api.reset_guard_hours()?;
            println!("{} guard hour counters reset", reset);
        }
        Command::PurgeShifts => {
            let purged = api.purge_shifts()?;
            println!("{} shifts deleted", purged);
        }
    }

    Ok(())
}
