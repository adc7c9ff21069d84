//! Recipient directory creation from roster entries.
//!
//! Takes the accepted roster rows and makes sure a directory exists for
//! each one, using the exact roster string as the directory name. Nothing
//! is ever deleted or renamed; a path already present in the wrong shape
//! is reported, not repaired.

use crate::roster::RosterEntry;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Outcome of one directory-create attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Directory newly created
    Created,
    /// Path already exists and is a directory
    AlreadyExisted,
    /// Path already exists but is not a directory
    Conflict,
    /// Creation failed with an OS error
    Failed(String),
}

/// Per-entry result of a sync run.
#[derive(Debug)]
pub struct EntryOutcome {
    pub folder_name: String,
    pub outcome: CreateOutcome,
}

/// Tally over a full run. Every attempt lands in exactly one bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub created: usize,
    pub existed: usize,
    pub conflicts: usize,
    pub failed: usize,
}

impl RegistryStats {
    pub fn total(&self) -> usize {
        self.created + self.existed + self.conflicts + self.failed
    }
}

/// Ensure a directory exists under `parent` for every roster entry.
///
/// The parent itself is created if missing. Entries are processed in
/// order; a duplicate folder name later in the list simply finds the
/// directory its twin just created.
pub fn sync_roster_dirs(parent: &Path, entries: &[RosterEntry]) -> Result<Vec<EntryOutcome>> {
    std::fs::create_dir_all(parent)
        .with_context(|| format!("could not create parent directory {}", parent.display()))?;

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = parent.join(&entry.folder_name);
        let outcome = if path.exists() {
            if path.is_dir() {
                CreateOutcome::AlreadyExisted
            } else {
                CreateOutcome::Conflict
            }
        } else {
            match std::fs::create_dir(&path) {
                Ok(()) => CreateOutcome::Created,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // Something else created the path between the check
                    // and the call; classify by what is there now.
                    if path.is_dir() {
                        CreateOutcome::AlreadyExisted
                    } else {
                        CreateOutcome::Conflict
                    }
                }
                Err(e) => CreateOutcome::Failed(e.to_string()),
            }
        };
        outcomes.push(EntryOutcome {
            folder_name: entry.folder_name.clone(),
            outcome,
        });
    }
    Ok(outcomes)
}

/// Count outcomes into the summary buckets.
pub fn tally(outcomes: &[EntryOutcome]) -> RegistryStats {
    let mut stats = RegistryStats::default();
    for entry in outcomes {
        match &entry.outcome {
            CreateOutcome::Created => stats.created += 1,
            CreateOutcome::AlreadyExisted => stats.existed += 1,
            CreateOutcome::Conflict => stats.conflicts += 1,
            CreateOutcome::Failed(_) => stats.failed += 1,
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipient::FolderName;

    fn entry(row: usize, folder_name: &str) -> RosterEntry {
        let parsed = crate::recipient::parse_folder_name(folder_name).unwrap_or(FolderName {
            area: "A01".to_string(),
            role: "SE".to_string(),
            chat_id: "1".to_string(),
            name: folder_name.to_string(),
        });
        RosterEntry {
            row,
            folder_name: folder_name.to_string(),
            parsed,
        }
    }

    #[test]
    fn test_creates_directories_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("recipients");
        let entries = vec![entry(2, "A01_SE_111_Vanda"), entry(3, "A02_DR_222_Naro")];

        let outcomes = sync_roster_dirs(&parent, &entries).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(
            outcomes
                .iter()
                .all(|o| o.outcome == CreateOutcome::Created)
        );
        assert!(parent.join("A01_SE_111_Vanda").is_dir());
        assert!(parent.join("A02_DR_222_Naro").is_dir());

        let stats = tally(&outcomes);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.total(), 2);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().to_path_buf();
        let entries = vec![entry(2, "A01_SE_111_Vanda")];

        sync_roster_dirs(&parent, &entries).unwrap();
        let outcomes = sync_roster_dirs(&parent, &entries).unwrap();

        assert_eq!(outcomes[0].outcome, CreateOutcome::AlreadyExisted);
        let stats = tally(&outcomes);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.existed, 1);
    }

    #[test]
    fn test_duplicate_rows_in_one_run() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(2, "A01_SE_111_Vanda"), entry(7, "A01_SE_111_Vanda")];

        let outcomes = sync_roster_dirs(dir.path(), &entries).unwrap();
        assert_eq!(outcomes[0].outcome, CreateOutcome::Created);
        assert_eq!(outcomes[1].outcome, CreateOutcome::AlreadyExisted);
    }

    #[test]
    fn test_file_in_the_way_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A01_SE_111_Vanda"), b"not a folder").unwrap();
        let entries = vec![entry(2, "A01_SE_111_Vanda")];

        let outcomes = sync_roster_dirs(dir.path(), &entries).unwrap();
        assert_eq!(outcomes[0].outcome, CreateOutcome::Conflict);

        let stats = tally(&outcomes);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn test_os_error_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        // Missing intermediate component; create_dir does not create parents.
        let entries = vec![entry(2, "missing/A01_SE_111_Vanda")];

        let outcomes = sync_roster_dirs(dir.path(), &entries).unwrap();
        match &outcomes[0].outcome {
            CreateOutcome::Failed(reason) => assert!(!reason.is_empty()),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_tally_counts_every_bucket_once() {
        let outcomes = vec![
            EntryOutcome {
                folder_name: "a".to_string(),
                outcome: CreateOutcome::Created,
            },
            EntryOutcome {
                folder_name: "b".to_string(),
                outcome: CreateOutcome::AlreadyExisted,
            },
            EntryOutcome {
                folder_name: "c".to_string(),
                outcome: CreateOutcome::Conflict,
            },
            EntryOutcome {
                folder_name: "d".to_string(),
                outcome: CreateOutcome::Failed("boom".to_string()),
            },
        ];
        let stats = tally(&outcomes);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.existed, 1);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 4);
    }
}
