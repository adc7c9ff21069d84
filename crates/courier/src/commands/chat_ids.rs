//! Chat-ids command implementation

use anyhow::Result;
use clap::Args;
use report_courier_core::config;
use report_courier_core::telegram::TelegramTransport;
use std::path::PathBuf;

use crate::util::pause;

/// List chats that recently messaged the bot
#[derive(Args, Debug)]
pub struct ChatIdsArgs {
    /// Base directory holding the config
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting (for double-click launches)
    #[arg(long)]
    pause: bool,
}

pub fn execute(args: ChatIdsArgs) -> Result<()> {
    let config = config::load_config(&args.base)?;
    let token = config.resolve_token()?;
    let transport = TelegramTransport::new(&config.bot.api_base, &token)?;
    let chats = transport.recent_chats()?;

    if args.json {
        let output = serde_json::json!({
            "action": "chat-ids",
            "chats": chats.iter().map(|chat| serde_json::json!({
                "id": chat.id,
                "type": chat.kind,
                "name": chat.display_name,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if chats.is_empty() {
        println!("No recent chats. Ask each recipient to message the bot, then run this again.");
    } else {
        println!("{:<15} {:<12} NAME", "CHAT ID", "TYPE");
        println!("{}", "-".repeat(45));
        for chat in &chats {
            println!("{:<15} {:<12} {}", chat.id, chat.kind, chat.display_name);
        }
        println!();
        println!("Use the CHAT ID value as the ChatId segment of the recipient folder name.");
    }

    if args.pause {
        pause::wait_for_enter();
    }
    Ok(())
}
