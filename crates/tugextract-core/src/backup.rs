//! Backup store for file contents captured before an edit is persisted.
//!
//! Each backup is two files in `<session>/backups/`:
//! - `<backup_id>.bak`: the original bytes
//! - `<backup_id>.json`: a [`BackupRecord`] sidecar (path, hash, timestamp)

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patch::ContentHash;
use crate::session::{format_timestamp, write_file_atomic, Session, SessionError, SessionResult};
use crate::util::generate_backup_id;

/// Metadata describing one backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Backup identifier (`backup_<hex>`).
    pub backup_id: String,
    /// Workspace-relative path of the backed-up file.
    pub file: String,
    /// Hash of the backed-up content.
    pub content_hash: ContentHash,
    /// When the backup was taken (ISO 8601).
    pub created_at: String,
}

/// Store of original file contents, rooted in a session.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Backup store for an open session.
    pub fn for_session(session: &Session) -> Self {
        BackupStore {
            dir: session.backups_dir(),
        }
    }

    fn content_path(&self, backup_id: &str) -> PathBuf {
        self.dir.join(format!("{}.bak", backup_id))
    }

    fn record_path(&self, backup_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", backup_id))
    }

    /// Capture `content` for `file` and return the new record.
    pub fn create(&self, file: &str, content: &str) -> SessionResult<BackupRecord> {
        let record = BackupRecord {
            backup_id: generate_backup_id(),
            file: file.to_string(),
            content_hash: ContentHash::compute(content.as_bytes()),
            created_at: format_timestamp(SystemTime::now()),
        };
        write_file_atomic(&self.content_path(&record.backup_id), content.as_bytes())?;
        let json = serde_json::to_string_pretty(&record)?;
        write_file_atomic(&self.record_path(&record.backup_id), json.as_bytes())?;
        debug!(
            backup_id = %record.backup_id,
            file = %record.file,
            hash = %record.content_hash.short(),
            "backup created"
        );
        Ok(record)
    }

    /// Load a backup's record and content, verifying the stored hash.
    pub fn load(&self, backup_id: &str) -> SessionResult<(BackupRecord, String)> {
        let record_path = self.record_path(backup_id);
        if !record_path.exists() {
            return Err(SessionError::BackupNotFound {
                backup_id: backup_id.to_string(),
            });
        }
        let record: BackupRecord = serde_json::from_str(&fs::read_to_string(&record_path)?)
            .map_err(|e| SessionError::SessionCorrupt {
                path: record_path.clone(),
                reason: e.to_string(),
            })?;
        let content_path = self.content_path(backup_id);
        let content = fs::read_to_string(&content_path)?;
        if ContentHash::compute(content.as_bytes()) != record.content_hash {
            return Err(SessionError::SessionCorrupt {
                path: content_path,
                reason: "backup content does not match its recorded hash".to_string(),
            });
        }
        Ok((record, content))
    }

    /// Delete a backup. Missing backups are ignored.
    pub fn remove(&self, backup_id: &str) -> SessionResult<()> {
        for path in [self.content_path(backup_id), self.record_path(backup_id)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
