//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod analyze;
mod chat_ids;
mod send;
mod sync;

/// courier - Office report distribution over Telegram
#[derive(Parser, Debug)]
#[command(
    name = "courier",
    version,
    about = "Office report distribution over Telegram",
    long_about = "Sync recipient folders from a roster, preview how incoming reports match recipients, and deliver report files to Telegram chats with bounded retry"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create recipient folders from the roster file
    Sync(sync::SyncArgs),

    /// Preview how incoming reports match recipient folders
    Analyze(analyze::AnalyzeArgs),

    /// Send recipient folder contents to their Telegram chats
    Send(send::SendArgs),

    /// List chats that recently messaged the bot
    ChatIds(chat_ids::ChatIdsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sync(args) => sync::execute(args),
            Commands::Analyze(args) => analyze::execute(args),
            Commands::Send(args) => send::execute(args),
            Commands::ChatIds(args) => chat_ids::execute(args),
        }
    }
}
