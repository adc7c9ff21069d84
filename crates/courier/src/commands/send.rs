//! Send command implementation

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use report_courier_core::config;
use report_courier_core::dispatch::{Dispatcher, RetryPolicy, ThreadSleeper};
use report_courier_core::recipient::Recipient;
use report_courier_core::report::{self, DeliveryReport, RecipientTiming};
use report_courier_core::scan;
use report_courier_core::telegram::TelegramTransport;
use std::path::PathBuf;
use std::time::Instant;

use crate::util::pause;

/// Send recipient folder contents to their Telegram chats
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Base directory holding the config and recipient folders
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Read SE_Name_ChatId folders directly under the base directory
    /// instead of dated subfolders under the recipients directory
    #[arg(long)]
    flat: bool,

    /// Date of the subfolder to send, as YYYYMMDD (defaults to today)
    #[arg(long, conflicts_with = "flat")]
    date: Option<String>,

    /// List what would be sent without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting (for double-click launches)
    #[arg(long)]
    pause: bool,
}

pub fn execute(args: SendArgs) -> Result<()> {
    let started = Instant::now();
    let config = config::load_config(&args.base)?;

    let (recipients, date_label) = if args.flat {
        (scan::flat_recipients(&args.base)?, None)
    } else {
        let parent = config.recipients_dir(&args.base);
        if !parent.is_dir() {
            anyhow::bail!(
                "recipients directory not found: {} (run 'courier sync' first)",
                parent.display()
            );
        }
        let date = resolve_date(args.date.as_deref())?;
        let recipients = scan::dated_recipients(&parent, &date)?;
        (recipients, Some(date))
    };

    if recipients.is_empty() {
        let message = match &date_label {
            Some(date) => format!("No recipient folder has a non-empty {date} subfolder"),
            None => format!("No SE_ folders found under {}", args.base.display()),
        };
        if args.json {
            let output = serde_json::json!({
                "action": "send",
                "date": date_label,
                "summary": { "recipients": 0, "sent": 0, "failed": 0 },
                "recipients": [],
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{message}");
        }
        if args.pause {
            pause::wait_for_enter();
        }
        return Ok(());
    }

    let mut work: Vec<(Recipient, Vec<PathBuf>)> = Vec::new();
    for recipient in recipients {
        let files = scan::eligible_files(&recipient.path, &scan::DISPATCH_FILTER)
            .with_context(|| format!("failed to scan {}", recipient.path.display()))?;
        work.push((recipient, files));
    }

    if !args.json {
        println!("Found {} recipient folder(s):", work.len());
        for (recipient, files) in &work {
            println!(
                "  {:<30} (ID: {:<12}) {} file(s)",
                recipient.display_name(),
                recipient.chat_id,
                files.len()
            );
        }
        println!();
    }

    if args.dry_run {
        return finish_dry_run(&args, date_label.as_deref(), &work);
    }

    let token = config.resolve_token()?;
    let transport = TelegramTransport::new(&config.bot.api_base, &token)?;
    let sleeper = ThreadSleeper;
    let dispatcher = Dispatcher {
        transport: &transport,
        sleeper: &sleeper,
        policy: RetryPolicy::default(),
    };

    let mut outcomes = Vec::new();
    let mut timings = Vec::new();
    for (recipient, files) in &work {
        let recipient_started = Instant::now();
        if !args.json {
            if files.is_empty() {
                println!("{}: no eligible files", recipient.display_name());
            } else {
                println!(
                    "Sending to {} (ID: {})...",
                    recipient.display_name(),
                    recipient.chat_id
                );
            }
        }

        let outcome = dispatcher.dispatch_recipient(recipient, files);

        if !args.json {
            for name in &outcome.sent {
                println!("  {name} - sent");
            }
            for failed in &outcome.failed {
                eprintln!("  {} - FAILED: {}", failed.name, failed.error);
            }
        }

        timings.push(RecipientTiming {
            name: outcome.name.clone(),
            elapsed: recipient_started.elapsed(),
        });
        outcomes.push(outcome);
    }

    let timestamp = Local::now();
    let delivery = DeliveryReport {
        timestamp,
        date_label: date_label.as_deref(),
        outcomes: &outcomes,
        timings: &timings,
        total_elapsed: started.elapsed(),
    };
    let text = report::render(&delivery);
    let log_path = report::write_log(&args.base, &timestamp, &text)?;

    let total_sent: usize = outcomes.iter().map(|o| o.sent.len()).sum();
    let total_failed: usize = outcomes.iter().map(|o| o.failed.len()).sum();

    if args.json {
        let output = serde_json::json!({
            "action": "send",
            "date": date_label,
            "log": log_path,
            "summary": {
                "recipients": outcomes.len(),
                "sent": total_sent,
                "failed": total_failed,
            },
            "recipients": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("{text}");
        println!();
        println!("Log saved: {}", log_path.display());
        if total_failed > 0 {
            println!("{total_failed} file(s) failed, see the log for details");
        } else {
            println!("All files delivered");
        }
    }

    if args.pause {
        pause::wait_for_enter();
    }
    Ok(())
}

fn finish_dry_run(
    args: &SendArgs,
    date_label: Option<&str>,
    work: &[(Recipient, Vec<PathBuf>)],
) -> Result<()> {
    if args.json {
        let output = serde_json::json!({
            "action": "send",
            "dry_run": true,
            "date": date_label,
            "recipients": work.iter().map(|(recipient, files)| serde_json::json!({
                "name": recipient.display_name(),
                "chat_id": recipient.chat_id,
                "files": files.iter()
                    .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Dry run - would send:");
        for (recipient, files) in work {
            for path in files {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    println!(
                        "  {name} -> {} (ID: {})",
                        recipient.display_name(),
                        recipient.chat_id
                    );
                }
            }
        }
    }
    if args.pause {
        pause::wait_for_enter();
    }
    Ok(())
}

fn resolve_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(value) => {
            chrono::NaiveDate::parse_from_str(value, "%Y%m%d")
                .with_context(|| format!("invalid --date '{value}': expected YYYYMMDD"))?;
            Ok(value.to_string())
        }
        None => Ok(Local::now().format("%Y%m%d").to_string()),
    }
}
