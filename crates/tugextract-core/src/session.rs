//! Session directory management.
//!
//! A session is the `.tugx/` directory inside a workspace. It holds:
//! - `backups/`: original file contents captured before each applied edit
//! - `journal.jsonl`: one line per applied edit (see [`crate::journal`])
//!
//! Sessions are opened per CLI invocation. Writes to workspace files and to
//! session files go through [`write_file_atomic`], so readers see either the
//! old or the new content and never a partial write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

/// Default session directory name, relative to the workspace root.
pub const SESSION_DIR_NAME: &str = ".tugx";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session directory is not writable.
    #[error("session directory is not writable: {path}")]
    SessionNotWritable { path: PathBuf },

    /// Workspace root does not exist.
    #[error("workspace not found at expected path: {expected}")]
    WorkspaceNotFound { expected: PathBuf },

    /// The requested backup does not exist.
    #[error("backup not found: {backup_id}")]
    BackupNotFound { backup_id: String },

    /// The journal has no entries to undo.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The file changed after the journaled edit was written.
    #[error("{path} changed since the edit was recorded")]
    StaleBackup {
        path: String,
        expected: String,
        actual: String,
    },

    /// Session data is corrupt.
    #[error("session data is corrupt: {reason}")]
    SessionCorrupt { path: PathBuf, reason: String },

    /// IO error during session operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// ============================================================================
// Session
// ============================================================================

/// Options for opening a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Explicit session directory (overrides `<workspace>/.tugx`).
    pub session_dir: Option<PathBuf>,
}

/// An open session bound to a workspace root.
#[derive(Debug, Clone)]
pub struct Session {
    workspace_root: PathBuf,
    session_dir: PathBuf,
}

impl Session {
    /// Open (creating if needed) the session for `workspace_root`.
    pub fn open(workspace_root: impl AsRef<Path>, options: SessionOptions) -> SessionResult<Self> {
        let workspace_root = workspace_root.as_ref();
        if !workspace_root.exists() {
            return Err(SessionError::WorkspaceNotFound {
                expected: workspace_root.to_path_buf(),
            });
        }
        let workspace_root = workspace_root.canonicalize()?;

        let session_dir = match options.session_dir {
            Some(dir) => dir,
            None => workspace_root.join(SESSION_DIR_NAME),
        };
        Self::ensure_session_structure(&session_dir)?;
        debug!(session_dir = %session_dir.display(), "session opened");

        Ok(Session {
            workspace_root,
            session_dir,
        })
    }

    fn ensure_session_structure(session_dir: &Path) -> SessionResult<()> {
        fs::create_dir_all(session_dir).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                SessionError::SessionNotWritable {
                    path: session_dir.to_path_buf(),
                }
            } else {
                SessionError::Io(e)
            }
        })?;
        let backups = session_dir.join("backups");
        if !backups.exists() {
            fs::create_dir_all(&backups)?;
        }
        Ok(())
    }

    /// Canonical workspace root.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Session directory.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Directory holding backup snapshots.
    pub fn backups_dir(&self) -> PathBuf {
        self.session_dir.join("backups")
    }

    /// Path of the change journal.
    pub fn journal_path(&self) -> PathBuf {
        self.session_dir.join("journal.jsonl")
    }

    /// Resolve a workspace-relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.workspace_root.join(relative)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Write content to a file atomically.
///
/// The content goes to a temp file in the destination directory which is then
/// persisted over `path`. If the process crashes before the rename the temp
/// file is discarded.
pub fn write_file_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Format a timestamp for JSON output (ISO 8601).
pub fn format_timestamp(time: SystemTime) -> String {
    use chrono::{DateTime, Utc};

    let datetime: DateTime<Utc> = time.into();
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_structure() {
        let workspace = TempDir::new().unwrap();
        let session = Session::open(workspace.path(), SessionOptions::default()).unwrap();

        assert!(session.session_dir().ends_with(SESSION_DIR_NAME));
        assert!(session.backups_dir().is_dir());
        assert!(!session.journal_path().exists());
    }

    #[test]
    fn explicit_session_dir_is_used() {
        let workspace = TempDir::new().unwrap();
        let custom = workspace.path().join("custom-session");
        let session = Session::open(
            workspace.path(),
            SessionOptions {
                session_dir: Some(custom.clone()),
            },
        )
        .unwrap();
        assert_eq!(session.session_dir(), custom.as_path());
        assert!(custom.join("backups").is_dir());
    }

    #[test]
    fn missing_workspace_is_rejected() {
        let workspace = TempDir::new().unwrap();
        let missing = workspace.path().join("nope");
        let err = Session::open(&missing, SessionOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::WorkspaceNotFound { .. }));
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("File.cs");
        fs::write(&path, "old").unwrap();
        write_file_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn timestamp_is_iso8601() {
        let ts = format_timestamp(SystemTime::UNIX_EPOCH);
        assert_eq!(ts, "1970-01-01T00:00:00Z");
    }
}
