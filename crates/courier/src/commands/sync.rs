//! Sync command implementation

use anyhow::Result;
use clap::Args;
use report_courier_core::config;
use report_courier_core::registry::{self, CreateOutcome, EntryOutcome};
use report_courier_core::roster;
use std::path::PathBuf;

use crate::util::pause;

/// Create recipient folders from the roster file
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Base directory holding the config, roster and recipient folders
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Roster file (overrides courier.toml)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// 1-based roster column holding folder names (overrides courier.toml)
    #[arg(long)]
    column: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting (for double-click launches)
    #[arg(long)]
    pause: bool,
}

pub fn execute(args: SyncArgs) -> Result<()> {
    let config = config::load_config(&args.base)?;
    let roster_path = match &args.roster {
        Some(path) => path.clone(),
        None => config.roster_path(&args.base),
    };
    let column = args.column.unwrap_or(config.roster.column);

    tracing::info!(roster = %roster_path.display(), column, "loading roster");
    let load = roster::load_roster(&roster_path, column)?;

    for skip in &load.skipped {
        eprintln!(
            "Warning: row {}: skipped '{}' ({})",
            skip.row, skip.value, skip.reason
        );
    }

    if load.entries.is_empty() {
        if args.json {
            let output = serde_json::json!({
                "action": "sync",
                "roster": roster_path,
                "column": column,
                "summary": {
                    "entries": 0,
                    "created": 0,
                    "existed": 0,
                    "conflicts": 0,
                    "failed": 0,
                    "skipped_rows": load.skipped.len(),
                },
                "outcomes": [],
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("No usable folder names in column {column} of {}", roster_path.display());
        }
        if args.pause {
            pause::wait_for_enter();
        }
        return Ok(());
    }

    let parent = config.recipients_dir(&args.base);
    let outcomes = registry::sync_roster_dirs(&parent, &load.entries)?;
    let stats = registry::tally(&outcomes);

    if args.json {
        let output = serde_json::json!({
            "action": "sync",
            "roster": roster_path,
            "column": column,
            "recipients_dir": parent,
            "summary": {
                "entries": outcomes.len(),
                "created": stats.created,
                "existed": stats.existed,
                "conflicts": stats.conflicts,
                "failed": stats.failed,
                "skipped_rows": load.skipped.len(),
            },
            "outcomes": outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Syncing {} roster entries into {}",
            outcomes.len(),
            parent.display()
        );
        println!();
        for entry in &outcomes {
            match &entry.outcome {
                CreateOutcome::Created => println!("  {} - created", entry.folder_name),
                CreateOutcome::AlreadyExisted => {
                    println!("  {} - already exists", entry.folder_name)
                }
                CreateOutcome::Conflict => {
                    eprintln!("  {} - CONFLICT: path exists but is not a folder", entry.folder_name)
                }
                CreateOutcome::Failed(reason) => {
                    eprintln!("  {} - FAILED: {reason}", entry.folder_name)
                }
            }
        }
        println!();
        println!(
            "Folder sync complete: {} created, {} existing, {} conflicts, {} failed",
            stats.created, stats.existed, stats.conflicts, stats.failed
        );
    }

    if args.pause {
        pause::wait_for_enter();
    }
    Ok(())
}

fn outcome_json(entry: &EntryOutcome) -> serde_json::Value {
    let (status, error) = match &entry.outcome {
        CreateOutcome::Created => ("created", None),
        CreateOutcome::AlreadyExisted => ("existed", None),
        CreateOutcome::Conflict => ("conflict", None),
        CreateOutcome::Failed(reason) => ("failed", Some(reason.as_str())),
    };
    match error {
        Some(reason) => serde_json::json!({
            "folder": entry.folder_name,
            "status": status,
            "error": reason,
        }),
        None => serde_json::json!({
            "folder": entry.folder_name,
            "status": status,
        }),
    }
}
