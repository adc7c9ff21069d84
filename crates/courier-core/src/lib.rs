//! Core types and operations for report-courier
//!
//! This crate implements the batch workflow behind the `courier` CLI:
//! loading a recipient roster, keeping per-recipient folders in sync,
//! matching incoming report files to recipients by name, and forwarding
//! files to Telegram chats with bounded retry.
//!
//! Everything here is synchronous and single-threaded. Operations are
//! short linear passes over the filesystem; the only suspension points
//! are blocking HTTP calls and the fixed retry backoff.

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod matching;
pub mod recipient;
pub mod registry;
pub mod report;
pub mod roster;
pub mod scan;
pub mod telegram;

pub use config::CourierConfig;
pub use dispatch::{FailedFile, RecipientOutcome};
pub use matching::Confidence;
pub use recipient::{FolderName, Recipient};
