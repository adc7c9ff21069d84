//! courier - Office report distribution over Telegram
//!
//! A small batch CLI wrapping the report-courier-core workflow: sync
//! recipient folders from a roster, preview how incoming reports match
//! recipients, and dispatch files to chats with bounded retry.

use clap::Parser;
use report_courier_core::logging;

mod commands;
mod util;

use commands::Cli;

fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
