//! Error types and error code constants for tugextract.
//!
//! This module provides a unified error type (`TugError`) that bridges
//! domain-specific errors from different subsystems (extraction, session,
//! configuration) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad range, bad method name, unknown language)
//! - `3`: Resolution errors (file not found, no insertion point)
//! - `4`: Apply errors (failed to write changes, stale undo)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, structural location not found).
    ResolutionError = 3,
    /// Apply errors (failed to write changes, backup mismatch).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered as
/// JSON. Each variant carries enough context for a helpful message and the
/// optional `details` field.
#[derive(Debug, Error)]
pub enum TugError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid identifier for the new method.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The source language could not be determined or is not supported.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The engine could not complete the extraction.
    #[error("extraction failed at {stage}: {message}")]
    ExtractionFailed {
        stage: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Configuration could not be loaded.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },

    /// Session error.
    #[error("session error: {message}")]
    SessionError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TugError> for OutputErrorCode {
    fn from(err: &TugError) -> Self {
        match err {
            TugError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TugError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            TugError::UnsupportedLanguage { .. } => OutputErrorCode::InvalidArguments,
            TugError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TugError::ExtractionFailed { stage, .. } => {
                if stage == "validation" {
                    OutputErrorCode::InvalidArguments
                } else if stage == "splice" {
                    OutputErrorCode::ResolutionError
                } else {
                    OutputErrorCode::InternalError
                }
            }
            TugError::ApplyError { .. } => OutputErrorCode::ApplyError,
            TugError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            TugError::InternalError { .. } => OutputErrorCode::InternalError,
            TugError::SessionError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TugError> for OutputErrorCode {
    fn from(err: TugError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges from core subsystems
// ============================================================================

impl From<crate::session::SessionError> for TugError {
    fn from(err: crate::session::SessionError) -> Self {
        use crate::session::SessionError;
        match err {
            SessionError::SessionNotWritable { path } => TugError::SessionError {
                message: format!("session directory not writable: {}", path.display()),
            },
            SessionError::WorkspaceNotFound { expected } => TugError::FileNotFound {
                path: expected.to_string_lossy().into_owned(),
            },
            SessionError::BackupNotFound { backup_id } => TugError::InvalidArguments {
                message: format!("no backup named {}", backup_id),
                details: Some(serde_json::json!({ "backup_id": backup_id })),
            },
            SessionError::NothingToUndo => TugError::InvalidArguments {
                message: "no recorded changes to undo".to_string(),
                details: None,
            },
            SessionError::StaleBackup {
                path,
                expected,
                actual,
            } => TugError::ApplyError {
                message: format!(
                    "file changed since the edit was recorded (expected {}, found {})",
                    expected, actual
                ),
                file: Some(path),
            },
            SessionError::SessionCorrupt { path, reason } => TugError::SessionError {
                message: format!("session corrupt at {}: {}", path.display(), reason),
            },
            SessionError::Io(io_err) => TugError::InternalError {
                message: format!("IO error: {}", io_err),
            },
            SessionError::Json(json_err) => TugError::InternalError {
                message: format!("JSON error: {}", json_err),
            },
        }
    }
}

impl From<crate::config::ConfigError> for TugError {
    fn from(err: crate::config::ConfigError) -> Self {
        TugError::ConfigError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TugError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TugError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        TugError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TugError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_invalid_arguments() {
            let err = TugError::invalid_args("missing required field");
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::InvalidArguments
            );
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn file_not_found_maps_to_resolution_error() {
            let err = TugError::file_not_found("Missing.cs");
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn extraction_stage_selects_code() {
            let validation = TugError::ExtractionFailed {
                stage: "validation".to_string(),
                message: "range out of bounds".to_string(),
                details: None,
            };
            let splice = TugError::ExtractionFailed {
                stage: "splice".to_string(),
                message: "no insertion point".to_string(),
                details: None,
            };
            let generation = TugError::ExtractionFailed {
                stage: "generation".to_string(),
                message: "empty body".to_string(),
                details: None,
            };
            assert_eq!(validation.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(splice.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(generation.error_code(), OutputErrorCode::InternalError);
        }

        #[test]
        fn apply_error_maps_to_apply_error() {
            let err = TugError::ApplyError {
                message: "stale backup".to_string(),
                file: Some("Program.cs".to_string()),
            };
            assert_eq!(err.error_code(), OutputErrorCode::ApplyError);
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn unsupported_language_is_caller_error() {
            let err = TugError::UnsupportedLanguage {
                language: "cobol".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = TugError::internal("unexpected state");
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn invalid_arguments_display() {
            let err = TugError::invalid_args("missing field");
            assert_eq!(err.to_string(), "invalid arguments: missing field");
        }

        #[test]
        fn extraction_failed_display() {
            let err = TugError::ExtractionFailed {
                stage: "splice".to_string(),
                message: "no insertion point".to_string(),
                details: None,
            };
            assert_eq!(
                err.to_string(),
                "extraction failed at splice: no insertion point"
            );
        }

        #[test]
        fn session_errors_bridge() {
            let err = TugError::from(crate::session::SessionError::NothingToUndo);
            assert!(matches!(err, TugError::InvalidArguments { .. }));
        }
    }

    mod output_error_code {
        use super::*;

        #[test]
        fn code_values_are_stable() {
            assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
            assert_eq!(OutputErrorCode::ResolutionError.code(), 3);
            assert_eq!(OutputErrorCode::ApplyError.code(), 4);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(format!("{}", OutputErrorCode::InvalidArguments), "2");
            assert_eq!(format!("{}", OutputErrorCode::InternalError), "10");
        }
    }
}
