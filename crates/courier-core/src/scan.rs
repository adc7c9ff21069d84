//! Directory scanning: recipient discovery and file eligibility.
//!
//! All listings come back sorted by name, so a run over the same tree
//! always dispatches and reports in the same order.

use crate::recipient::{self, Recipient};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File eligibility filter.
#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    /// Strict lower bound; a file of exactly this size is excluded.
    pub min_bytes: u64,
    /// Exclude names starting with `~` or `.` (editor locks, hidden files).
    pub skip_hidden: bool,
}

/// Filter for scanning incoming report workbooks. Anything at or below
/// 1000 bytes is treated as an empty export.
pub const PREVIEW_FILTER: FileFilter = FileFilter {
    min_bytes: 1000,
    skip_hidden: false,
};

/// Filter applied before dispatching. A real report is well above 5000
/// bytes; smaller files are placeholders not worth a chat message.
pub const DISPATCH_FILTER: FileFilter = FileFilter {
    min_bytes: 5000,
    skip_hidden: true,
};

impl FileFilter {
    /// Whether a file with this name and size should be processed.
    pub fn accepts(&self, name: &str, size: u64) -> bool {
        if size <= self.min_bytes {
            return false;
        }
        if self.skip_hidden && (name.starts_with('~') || name.starts_with('.')) {
            return false;
        }
        true
    }
}

/// List the eligible regular files in `dir`, sorted by file name.
pub fn eligible_files(dir: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("could not read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("could not stat {}", path.display()))?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            debug!("skipping non-UTF-8 file name in {}", dir.display());
            continue;
        };
        if !filter.accepts(name, metadata.len()) {
            debug!("filtered out {name} ({} bytes)", metadata.len());
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Incoming report workbooks: `.xlsx`/`.xls` files above the preview
/// threshold, sorted by file name. Extension comparison ignores case.
pub fn incoming_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("could not read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("could not stat {}", path.display()))?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let lower = name.to_ascii_lowercase();
        if !lower.ends_with(".xlsx") && !lower.ends_with(".xls") {
            continue;
        }
        if !PREVIEW_FILTER.accepts(name, metadata.len()) {
            debug!("filtered out tiny workbook {name}");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Names of all subdirectories of `parent`, sorted. This is the candidate
/// list for matching; unparseable folder names still participate, since
/// the substring tiers do not require the canonical form.
pub fn folder_names(parent: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(parent)
        .with_context(|| format!("could not read directory {}", parent.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Flat-mode recipients: `SE_Name_ChatId` folders directly under `base`,
/// sorted by folder name. The dispatch path is the folder itself.
pub fn flat_recipients(base: &Path) -> Result<Vec<Recipient>> {
    let entries = std::fs::read_dir(base)
        .with_context(|| format!("could not read directory {}", base.display()))?;

    let mut recipients = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(folder_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Some((name, chat_id)) = recipient::parse_flat_folder_name(&folder_name) else {
            continue;
        };
        recipients.push(Recipient {
            path,
            folder_name,
            name,
            chat_id,
            role: None,
            area: None,
        });
    }
    recipients.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    Ok(recipients)
}

/// Dated-mode recipients: canonical `Area_Role_ChatId_Name` folders under
/// `parent` that contain a non-empty subfolder named `date` (`YYYYMMDD`).
/// The dispatch path is the dated subfolder. Folders without one are
/// skipped entirely; they have nothing to send today.
pub fn dated_recipients(parent: &Path, date: &str) -> Result<Vec<Recipient>> {
    let entries = std::fs::read_dir(parent)
        .with_context(|| format!("could not read directory {}", parent.display()))?;

    let mut recipients = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(folder_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Some(parsed) = recipient::parse_folder_name(&folder_name) else {
            debug!("ignoring non-canonical folder {folder_name}");
            continue;
        };
        let dated = path.join(date);
        if !dated.is_dir() {
            continue;
        }
        let is_empty = dated
            .read_dir()
            .with_context(|| format!("could not read directory {}", dated.display()))?
            .next()
            .is_none();
        if is_empty {
            continue;
        }
        recipients.push(Recipient {
            path: dated,
            folder_name,
            name: parsed.name,
            chat_id: parsed.chat_id,
            role: Some(parsed.role),
            area: Some(parsed.area),
        });
    }
    recipients.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    Ok(recipients)
}
