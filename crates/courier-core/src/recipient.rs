//! Recipient folder-name grammars.
//!
//! Two layouts are in use. The canonical form `Area_Role_ChatId_Name`
//! drives roster validation and dated-mode scanning; the older flat form
//! `SE_Name_ChatId` survives for folders created by hand before the roster
//! workflow existed.

use std::path::PathBuf;

/// Parsed canonical folder name: `Area_Role_ChatId_Name...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName {
    pub area: String,
    pub role: String,
    pub chat_id: String,
    pub name: String,
}

impl FolderName {
    /// Human-facing name, e.g. `Uy Naro (SE)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}

/// One dispatchable recipient directory.
///
/// `path` is the directory whose files get sent: the folder itself in flat
/// mode, the dated subfolder in dated mode. No courier operation ever
/// deletes it.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub path: PathBuf,
    pub folder_name: String,
    pub name: String,
    pub chat_id: String,
    pub role: Option<String>,
    pub area: Option<String>,
}

impl Recipient {
    /// Name with the role appended when one is known.
    pub fn display_name(&self) -> String {
        match &self.role {
            Some(role) => format!("{} ({role})", self.name),
            None => self.name.clone(),
        }
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the canonical `Area_Role_ChatId_Name` form.
///
/// The name may itself contain underscores or spaces; every segment after
/// the chat id is rejoined with single spaces. The chat id must be numeric.
/// Returns `None` for anything that does not fit the grammar.
pub fn parse_folder_name(folder_name: &str) -> Option<FolderName> {
    let parts: Vec<&str> = folder_name.trim().split('_').collect();
    if parts.len() < 4 {
        return None;
    }
    if !is_all_digits(parts[2]) {
        return None;
    }
    Some(FolderName {
        area: parts[0].to_string(),
        role: parts[1].to_string(),
        chat_id: parts[2].to_string(),
        name: parts[3..].join(" "),
    })
}

/// Parse the legacy flat form `SE_<Name>_<ChatId>`.
///
/// Splits at most twice, so the name keeps any spaces but never an
/// underscore. The trailing segment must be numeric; a folder whose id
/// segment is not a chat id can never be dispatched to, so it is skipped
/// rather than carried along.
pub fn parse_flat_folder_name(folder_name: &str) -> Option<(String, String)> {
    if !folder_name.starts_with("SE_") {
        return None;
    }
    let mut parts = folder_name.splitn(3, '_');
    parts.next()?;
    let name = parts.next()?;
    let chat_id = parts.next()?;
    if !is_all_digits(chat_id) {
        return None;
    }
    Some((name.to_string(), chat_id.to_string()))
}
