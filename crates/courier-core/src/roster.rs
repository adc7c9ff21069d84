//! Roster file loading.
//!
//! The roster is a tab-separated export of the staffing workbook. One
//! column holds recipient folder names in the canonical
//! `Area_Role_ChatId_Name` form; everything else in the file is ignored.
//! Tab is the delimiter because recipient names contain spaces.

use crate::recipient::{self, FolderName};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the roster
#[derive(Debug, Error)]
pub enum RosterError {
    /// Roster file does not exist
    #[error("roster file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// File I/O error
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One accepted roster row.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    /// 1-based row number in the roster file
    pub row: usize,
    /// Exact string used as the directory name
    pub folder_name: String,
    /// Structured view of the same string
    pub parsed: FolderName,
}

/// Why a row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Trailing dot or space, invalid as a directory name on Windows
    TrailingDotOrSpace,
    /// Does not fit the `Area_Role_ChatId_Name` grammar
    Unparseable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TrailingDotOrSpace => write!(f, "trailing dot or space"),
            SkipReason::Unparseable => write!(f, "not in Area_Role_ChatId_Name form"),
        }
    }
}

/// One rejected roster row, kept so the caller can warn about it.
#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub row: usize,
    pub value: String,
    pub reason: SkipReason,
}

/// Result of a roster load: accepted entries plus reportable rejects.
#[derive(Debug, Default)]
pub struct RosterLoad {
    pub entries: Vec<RosterEntry>,
    pub skipped: Vec<SkippedRow>,
}

/// Load recipient entries from a tab-separated roster file.
///
/// Row 1 is a header and is always skipped. `column` is 1-based (the
/// default configuration points at column 10, the workbook's column J).
/// Blank or missing cells are skipped silently. Cells with a trailing dot
/// or space and cells that do not parse are recorded in `skipped` rather
/// than dropped, so the operator sees every row that needs fixing.
pub fn load_roster(path: &Path, column: usize) -> Result<RosterLoad, RosterError> {
    if !path.exists() {
        return Err(RosterError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let index = column.saturating_sub(1);
    let mut load = RosterLoad::default();

    for (idx, line) in contents.lines().enumerate() {
        let row = idx + 1;
        if row == 1 {
            continue;
        }
        let Some(cell) = line.split('\t').nth(index) else {
            continue;
        };
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Checked on the raw cell: a name the workbook exported with a
        // trailing space must be fixed there, not silently normalized.
        if cell.ends_with('.') || cell.ends_with(' ') {
            load.skipped.push(SkippedRow {
                row,
                value: cell.to_string(),
                reason: SkipReason::TrailingDotOrSpace,
            });
            continue;
        }
        match recipient::parse_folder_name(trimmed) {
            Some(parsed) => load.entries.push(RosterEntry {
                row,
                folder_name: trimmed.to_string(),
                parsed,
            }),
            None => load.skipped.push(SkippedRow {
                row,
                value: trimmed.to_string(),
                reason: SkipReason::Unparseable,
            }),
        }
    }

    Ok(load)
}
