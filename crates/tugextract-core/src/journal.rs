//! Change journal: an append-only JSONL log of applied edits.
//!
//! Every persisted extraction appends one [`JournalEntry`] holding the
//! content hashes of the file before and after the edit plus the backup that
//! can restore it. Undo appends a second entry that marks the first as
//! reverted; entries are never rewritten.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backup::BackupStore;
use crate::patch::ContentHash;
use crate::session::{format_timestamp, write_file_atomic, Session, SessionError, SessionResult};
use crate::util::generate_undo_token;

/// Operation label written for undo entries.
pub const UNDO_OPERATION: &str = "undo";

/// One line of the change journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry identifier (`undo_<hex>`), usable as an undo token.
    pub entry_id: String,
    /// Workspace-relative path of the edited file.
    pub file_path: String,
    /// Hash of the file before the edit.
    pub original_hash: ContentHash,
    /// Hash of the file after the edit.
    pub modified_hash: ContentHash,
    /// Operation name, e.g. `extract-method`.
    pub operation_label: String,
    /// Backup holding the original content.
    pub backup_id: String,
    /// Operation-specific metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Entry this one reverts (undo entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverts: Option<String>,
    /// When the entry was recorded (ISO 8601).
    pub recorded_at: String,
}

/// A change ready to be journaled.
#[derive(Debug, Clone)]
pub struct ChangeRecord<'a> {
    pub file_path: &'a str,
    pub original_text: &'a str,
    pub modified_text: &'a str,
    pub operation_label: &'a str,
    pub backup_id: &'a str,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Result of reverting a journaled change.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoOutcome {
    /// The entry that was reverted.
    pub reverted: JournalEntry,
    /// The undo entry appended to the journal.
    pub undo_entry: JournalEntry,
}

/// Append-only journal stored at `<session>/journal.jsonl`.
#[derive(Debug, Clone)]
pub struct ChangeJournal {
    path: PathBuf,
}

impl ChangeJournal {
    /// Journal for an open session.
    pub fn for_session(session: &Session) -> Self {
        ChangeJournal {
            path: session.journal_path(),
        }
    }

    /// Append an entry for an applied change.
    pub fn record(&self, change: ChangeRecord<'_>) -> SessionResult<JournalEntry> {
        let entry = JournalEntry {
            entry_id: generate_undo_token(),
            file_path: change.file_path.to_string(),
            original_hash: ContentHash::compute(change.original_text.as_bytes()),
            modified_hash: ContentHash::compute(change.modified_text.as_bytes()),
            operation_label: change.operation_label.to_string(),
            backup_id: change.backup_id.to_string(),
            metadata: change.metadata,
            reverts: None,
            recorded_at: format_timestamp(SystemTime::now()),
        };
        self.append(&entry)?;
        debug!(entry_id = %entry.entry_id, file = %entry.file_path, "journal entry recorded");
        Ok(entry)
    }

    fn append(&self, entry: &JournalEntry) -> SessionResult<()> {
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// All entries in recording order.
    pub fn entries(&self) -> SessionResult<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry =
                serde_json::from_str(line).map_err(|e| SessionError::SessionCorrupt {
                    path: self.path.clone(),
                    reason: format!("line {}: {}", idx + 1, e),
                })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Entries that have not been reverted, oldest first.
    pub fn active_entries(&self) -> SessionResult<Vec<JournalEntry>> {
        let entries = self.entries()?;
        let reverted: Vec<String> = entries.iter().filter_map(|e| e.reverts.clone()).collect();
        Ok(entries
            .into_iter()
            .filter(|e| e.operation_label != UNDO_OPERATION && !reverted.contains(&e.entry_id))
            .collect())
    }

    /// Revert a journaled change by restoring its backup.
    ///
    /// With `backup_id` the matching active entry is reverted; otherwise the
    /// most recent one. The file must still hash to the entry's modified hash.
    pub fn undo(&self, session: &Session, backup_id: Option<&str>) -> SessionResult<UndoOutcome> {
        let active = self.active_entries()?;
        let target = match backup_id {
            Some(id) => active
                .iter()
                .rev()
                .find(|e| e.backup_id == id || e.entry_id == id)
                .cloned()
                .ok_or_else(|| SessionError::BackupNotFound {
                    backup_id: id.to_string(),
                })?,
            None => active.last().cloned().ok_or(SessionError::NothingToUndo)?,
        };

        let file = session.resolve(&target.file_path);
        let current = fs::read_to_string(&file)?;
        let current_hash = ContentHash::compute(current.as_bytes());
        if current_hash != target.modified_hash {
            return Err(SessionError::StaleBackup {
                path: target.file_path.clone(),
                expected: target.modified_hash.0.clone(),
                actual: current_hash.0,
            });
        }

        let store = BackupStore::for_session(session);
        let (_, original) = store.load(&target.backup_id)?;
        write_file_atomic(&file, original.as_bytes())?;

        let undo_entry = JournalEntry {
            entry_id: generate_undo_token(),
            file_path: target.file_path.clone(),
            original_hash: target.modified_hash.clone(),
            modified_hash: target.original_hash.clone(),
            operation_label: UNDO_OPERATION.to_string(),
            backup_id: target.backup_id.clone(),
            metadata: BTreeMap::new(),
            reverts: Some(target.entry_id.clone()),
            recorded_at: format_timestamp(SystemTime::now()),
        };
        self.append(&undo_entry)?;
        info!(file = %target.file_path, backup_id = %target.backup_id, "change reverted");

        Ok(UndoOutcome {
            reverted: target,
            undo_entry,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use tempfile::TempDir;

    fn setup(original: &str) -> (TempDir, Session) {
        let workspace = TempDir::new().unwrap();
        fs::write(workspace.path().join("Calc.cs"), original).unwrap();
        let session = Session::open(workspace.path(), SessionOptions::default()).unwrap();
        (workspace, session)
    }

    fn apply_change(session: &Session, original: &str, modified: &str) -> JournalEntry {
        let backup = BackupStore::for_session(session)
            .create("Calc.cs", original)
            .unwrap();
        fs::write(session.resolve("Calc.cs"), modified).unwrap();
        ChangeJournal::for_session(session)
            .record(ChangeRecord {
                file_path: "Calc.cs",
                original_text: original,
                modified_text: modified,
                operation_label: "extract-method",
                backup_id: &backup.backup_id,
                metadata: BTreeMap::new(),
            })
            .unwrap()
    }

    #[test]
    fn record_appends_entries_in_order() {
        let (_ws, session) = setup("v1");
        let first = apply_change(&session, "v1", "v2");
        let second = apply_change(&session, "v2", "v3");
        let entries = ChangeJournal::for_session(&session).entries().unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn undo_restores_most_recent_change() {
        let (_ws, session) = setup("v1");
        apply_change(&session, "v1", "v2");
        let journal = ChangeJournal::for_session(&session);

        let outcome = journal.undo(&session, None).unwrap();
        assert_eq!(outcome.reverted.operation_label, "extract-method");
        assert_eq!(fs::read_to_string(session.resolve("Calc.cs")).unwrap(), "v1");
        assert!(journal.active_entries().unwrap().is_empty());
    }

    #[test]
    fn undo_by_backup_id() {
        let (_ws, session) = setup("v1");
        let entry = apply_change(&session, "v1", "v2");
        let journal = ChangeJournal::for_session(&session);
        let outcome = journal.undo(&session, Some(&entry.backup_id)).unwrap();
        assert_eq!(outcome.reverted.entry_id, entry.entry_id);
        assert_eq!(outcome.undo_entry.reverts, Some(entry.entry_id));
    }

    #[test]
    fn undo_refuses_when_file_changed() {
        let (_ws, session) = setup("v1");
        apply_change(&session, "v1", "v2");
        fs::write(session.resolve("Calc.cs"), "edited by hand").unwrap();
        let err = ChangeJournal::for_session(&session)
            .undo(&session, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::StaleBackup { .. }));
    }

    #[test]
    fn undo_with_empty_journal() {
        let (_ws, session) = setup("v1");
        let err = ChangeJournal::for_session(&session)
            .undo(&session, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::NothingToUndo));
    }
}
