//! Courier configuration: `courier.toml` in the base directory plus
//! environment overrides.
//!
//! Every field is optional; a missing config file yields the defaults.
//! The bot token is the only secret and is resolved lazily, so commands
//! that never touch the network run without one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name, looked up in the base directory.
pub const CONFIG_FILE: &str = "courier.toml";

/// Environment override for the bot token. Takes precedence over the file.
pub const TOKEN_ENV: &str = "COURIER_BOT_TOKEN";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// No token in the file and none in the environment
    #[error("bot token not configured (set [bot] token in courier.toml or {TOKEN_ENV})")]
    MissingToken,

    /// Token contains interior whitespace
    #[error("bot token must not contain whitespace")]
    InvalidToken,
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Telegram bot settings
    #[serde(default)]
    pub bot: BotConfig,
    /// Directory layout under the base directory
    #[serde(default)]
    pub folders: FolderConfig,
    /// Roster file settings
    #[serde(default)]
    pub roster: RosterConfig,
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token; `COURIER_BOT_TOKEN` overrides this
    #[serde(default)]
    pub token: Option<String>,
    /// API base URL, overridable for testing
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
        }
    }
}

/// Directory layout under the base directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Directory scanned for incoming report workbooks
    #[serde(default = "default_incoming")]
    pub incoming: String,
    /// Parent directory of per-recipient folders
    #[serde(default = "default_recipients")]
    pub recipients: String,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            incoming: default_incoming(),
            recipients: default_recipients(),
        }
    }
}

/// Roster file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Roster file name, tab-separated text
    #[serde(default = "default_roster_file")]
    pub file: String,
    /// 1-based column holding the recipient folder name
    #[serde(default = "default_roster_column")]
    pub column: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            file: default_roster_file(),
            column: default_roster_column(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_incoming() -> String {
    "incoming".to_string()
}

fn default_recipients() -> String {
    "recipients".to_string()
}

fn default_roster_file() -> String {
    "roster.tsv".to_string()
}

// Column J of the source workbook.
fn default_roster_column() -> usize {
    10
}

/// Load configuration from `courier.toml` in the base directory.
///
/// A missing file is not an error; defaults apply. A malformed file is
/// fatal, since silently falling back to default folders would make the
/// tool operate on the wrong directories.
pub fn load_config(base: &Path) -> Result<CourierConfig, ConfigError> {
    let path = base.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(CourierConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: CourierConfig = toml::from_str(&contents)?;
    Ok(config)
}

impl CourierConfig {
    /// Resolve the bot token: environment first, then the config file.
    ///
    /// Validated non-empty and free of interior whitespace; called only by
    /// commands that are about to talk to the API.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.bot.token.clone())
            .ok_or(ConfigError::MissingToken)?;

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if token.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidToken);
        }
        Ok(token)
    }

    /// Incoming-reports directory under the base directory.
    pub fn incoming_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.folders.incoming)
    }

    /// Recipient-folders parent under the base directory.
    pub fn recipients_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.folders.recipients)
    }

    /// Roster file path under the base directory.
    pub fn roster_path(&self, base: &Path) -> PathBuf {
        base.join(&self.roster.file)
    }
}
