//! Analyze command implementation

use anyhow::Result;
use clap::Args;
use report_courier_core::config;
use report_courier_core::matching::{self, Confidence, MatchResult};
use report_courier_core::scan;
use std::path::PathBuf;

use crate::util::pause;

/// Preview how incoming reports match recipient folders
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Base directory holding the config, incoming reports and recipient folders
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting (for double-click launches)
    #[arg(long)]
    pause: bool,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let config = config::load_config(&args.base)?;

    let incoming = config.incoming_dir(&args.base);
    if !incoming.is_dir() {
        anyhow::bail!(
            "incoming directory not found: {} (create it and drop report files inside)",
            incoming.display()
        );
    }

    let recipients_dir = config.recipients_dir(&args.base);
    let folders = if recipients_dir.is_dir() {
        scan::folder_names(&recipients_dir)?
    } else {
        eprintln!(
            "Warning: recipients directory not found: {} (run 'courier sync' first)",
            recipients_dir.display()
        );
        Vec::new()
    };

    let files = scan::incoming_reports(&incoming)?;
    if files.is_empty() {
        if args.json {
            let output = serde_json::json!({
                "action": "analyze",
                "incoming": incoming,
                "summary": { "files": 0, "matched": 0, "risky": 0, "unknown": 0 },
                "files_detail": [],
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("No report files found in {}", incoming.display());
        }
        if args.pause {
            pause::wait_for_enter();
        }
        return Ok(());
    }

    let results: Vec<(String, MatchResult)> = files
        .iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = matching::match_report(&file_name, &folders);
            (file_name, result)
        })
        .collect();

    let matched = results
        .iter()
        .filter(|(_, r)| matches!(r.confidence, Confidence::Exact | Confidence::Substring))
        .count();
    let risky = results
        .iter()
        .filter(|(_, r)| r.confidence == Confidence::PartialWord)
        .count();
    let unknown = results.len() - matched - risky;

    if args.json {
        let output = serde_json::json!({
            "action": "analyze",
            "incoming": incoming,
            "recipients_dir": recipients_dir,
            "summary": {
                "files": results.len(),
                "folders": folders.len(),
                "matched": matched,
                "risky": risky,
                "unknown": unknown,
            },
            "files_detail": results.iter().map(|(file, r)| serde_json::json!({
                "file": file,
                "extracted_name": r.extracted_name,
                "folder": r.folder,
                "confidence": confidence_label(r.confidence),
                "score": r.confidence.score(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_folder_preview(&folders);

        println!("{:<35} {:<25} MATCH RESULT", "FILE NAME", "EXTRACTED NAME");
        println!("{}", "-".repeat(75));
        for (file, result) in &results {
            println!(
                "{:<35} {:<25} {}",
                file,
                result.extracted_name,
                verdict(result)
            );
        }

        println!();
        println!("{}", "=".repeat(75));
        println!("Total files analyzed : {}", results.len());
        println!("Good matches         : {matched}");
        println!("Risky matches        : {risky}");
        println!("Unknown names        : {unknown}");
        if unknown > 0 || risky > 0 {
            println!();
            if unknown > 0 {
                println!("{unknown} file(s) have no matching recipient folder; check the roster");
            }
            if risky > 0 {
                println!("{risky} file(s) matched only on a partial word; verify before sending");
            }
        } else {
            println!();
            println!("All files matched cleanly");
        }
    }

    if args.pause {
        pause::wait_for_enter();
    }
    Ok(())
}

fn print_folder_preview(folders: &[String]) {
    if folders.is_empty() {
        return;
    }
    println!("Found {} recipient folders", folders.len());
    if folders.len() <= 5 {
        for folder in folders {
            println!("  - {folder}");
        }
    } else {
        for folder in &folders[..3] {
            println!("  - {folder}");
        }
        println!("  - ... (+{} more)", folders.len() - 3);
    }
    println!();
}

fn verdict(result: &MatchResult) -> String {
    match (&result.folder, result.confidence) {
        (Some(folder), Confidence::Exact) => format!("EXACT -> {folder}"),
        (Some(folder), Confidence::Substring) => format!("GOOD -> {folder}"),
        (Some(folder), Confidence::PartialWord) => format!("RISKY -> {folder} (partial match)"),
        _ => "UNKNOWN (no match found)".to_string(),
    }
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::Exact => "exact",
        Confidence::Substring => "good",
        Confidence::PartialWord => "risky",
        Confidence::None => "unknown",
    }
}
