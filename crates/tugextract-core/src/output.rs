//! JSON output types and serialization for CLI responses.
//!
//! These types form the agent contract.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** All structured CLI output is valid JSON; previews may
//!    print a plain unified diff instead
//! 2. **Status first:** Every response has `status` as first field
//! 3. **Deterministic:** Same input -> same output (field order, array ordering)
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TugError};
use crate::journal::UndoOutcome;
use crate::patch::MaterializedPatch;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Summary
// ============================================================================

/// Size of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of files changed.
    pub files_changed: u32,
    /// Number of edits.
    pub edits_count: u32,
    /// Bytes added by the edits.
    pub bytes_added: i64,
    /// Bytes removed by the edits.
    pub bytes_removed: i64,
}

impl Summary {
    /// Compute summary statistics from a patch.
    pub fn from_patch(patch: &MaterializedPatch) -> Self {
        let mut files: Vec<&str> = patch.edits.iter().map(|e| e.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        Summary {
            files_changed: files.len() as u32,
            edits_count: patch.edits.len() as u32,
            bytes_added: patch.edits.iter().map(|e| e.new_text.len() as i64).sum(),
            bytes_removed: patch.edits.iter().map(|e| e.old_text.len() as i64).sum(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a TugError.
    pub fn from_error(err: &TugError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();
        let details = match err {
            TugError::InvalidArguments { details, .. } => details.clone(),
            TugError::ExtractionFailed { stage, details, .. } => {
                let mut value = details.clone().unwrap_or_else(|| serde_json::json!({}));
                if let Some(map) = value.as_object_mut() {
                    map.insert("stage".to_string(), serde_json::json!(stage));
                }
                Some(value)
            }
            TugError::InvalidIdentifier { name, reason } => {
                Some(serde_json::json!({ "name": name, "reason": reason }))
            }
            TugError::UnsupportedLanguage { language } => {
                Some(serde_json::json!({ "language": language }))
            }
            TugError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            TugError::ApplyError { file, .. } => {
                file.as_ref().map(|f| serde_json::json!({ "file": f }))
            }
            _ => None,
        };
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a TugError.
    pub fn from_error(err: &TugError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }

    /// Create an error response with just code and message.
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code,
                message: message.into(),
                details: None,
            },
        }
    }
}

// ============================================================================
// Undo
// ============================================================================

/// Response for the `undo` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// File that was restored.
    pub file: String,
    /// Backup that was restored.
    pub backup_id: String,
    /// Operation that was reverted.
    pub reverted_operation: String,
    /// Journal entry id of the reverted change.
    pub reverted_entry: String,
    /// Journal entry id of the undo itself.
    pub undo_entry: String,
}

impl UndoResponse {
    /// Build the response from an undo outcome.
    pub fn from_outcome(outcome: &UndoOutcome) -> Self {
        UndoResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: outcome.reverted.file_path.clone(),
            backup_id: outcome.reverted.backup_id.clone(),
            reverted_operation: outcome.reverted.operation_label.clone(),
            reverted_entry: outcome.reverted.entry_id.clone(),
            undo_entry: outcome.undo_entry.entry_id.clone(),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::OutputEdit;

    mod error_response {
        use super::*;

        #[test]
        fn status_first_and_code_present() {
            let err = TugError::file_not_found("Missing.cs");
            let response = ErrorResponse::from_error(&err);
            let json = serde_json::to_string(&response).unwrap();
            assert!(json.starts_with("{\"status\":\"error\""));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["error"]["code"], 3);
            assert_eq!(value["error"]["details"]["path"], "Missing.cs");
        }

        #[test]
        fn extraction_failure_carries_stage() {
            let err = TugError::ExtractionFailed {
                stage: "validation".to_string(),
                message: "range out of bounds".to_string(),
                details: Some(serde_json::json!({ "end_line": 99 })),
            };
            let info = ErrorInfo::from_error(&err);
            let details = info.details.unwrap();
            assert_eq!(details["stage"], "validation");
            assert_eq!(details["end_line"], 99);
            assert_eq!(info.code, 2);
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn counts_bytes_and_files() {
            let content = "a\nb\nc\n";
            let patch = MaterializedPatch::from_edits(vec![
                OutputEdit::replace_lines("A.cs", content, 1, 2, &["call();".to_string()], "\n"),
                OutputEdit::replace_lines("A.cs", content, 3, 0, &["m".to_string()], "\n"),
            ]);
            let summary = Summary::from_patch(&patch);
            assert_eq!(summary.files_changed, 1);
            assert_eq!(summary.edits_count, 2);
            assert_eq!(summary.bytes_removed, 4);
            assert_eq!(summary.bytes_added, 10);
        }
    }

    mod emission {
        use super::*;

        #[test]
        fn emit_response_produces_valid_json() {
            let response = ErrorResponse::new(10, "boom");
            let mut output = Vec::new();
            emit_response(&response, &mut output).unwrap();
            let json_str = String::from_utf8(output).unwrap();
            let _parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        }

        #[test]
        fn compact_is_single_line() {
            let response = ErrorResponse::new(2, "bad");
            let mut output = Vec::new();
            emit_response_compact(&response, &mut output).unwrap();
            let text = String::from_utf8(output).unwrap();
            assert_eq!(text.lines().count(), 1);
        }
    }
}
