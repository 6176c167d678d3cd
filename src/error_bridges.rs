// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Bridges from engine outcomes to `TugError`.
//!
//! The engine never returns `Err`: a rejected request comes back as a
//! `RefactoringResult` with `success == false`. The front doors turn those
//! into `TugError` so they share the error envelope and exit codes.

use std::io;
use std::path::Path;

use tugextract_core::error::TugError;
use tugextract_engine::types::Severity;
use tugextract_engine::{FailureKind, RefactoringResult};

/// Error for a failed extraction.
///
/// The failing stage picks the exit code; diagnostics and the last completed
/// stage go into `details`.
pub(crate) fn extraction_failure(result: &RefactoringResult) -> TugError {
    let kind = result.failure.unwrap_or(FailureKind::Generation);
    let diagnostics: Vec<serde_json::Value> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity >= Severity::Warning)
        .map(|d| serde_json::json!({ "code": d.code, "message": d.message }))
        .collect();
    TugError::ExtractionFailed {
        stage: kind.as_str().to_string(),
        message: result.message.clone(),
        details: Some(serde_json::json!({
            "completed_stage": result.stage,
            "diagnostics": diagnostics,
        })),
    }
}

/// Error for a source file that could not be read.
pub(crate) fn read_failure(path: &Path, display: &str, err: io::Error) -> TugError {
    if err.kind() == io::ErrorKind::NotFound {
        TugError::file_not_found(display)
    } else {
        TugError::internal(format!("cannot read {}: {}", path.display(), err))
    }
}

/// Error for a modified file that could not be written.
pub(crate) fn write_failure(display: &str, err: io::Error) -> TugError {
    TugError::ApplyError {
        message: format!("cannot write {}: {}", display, err),
        file: Some(display.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tugextract_core::error::OutputErrorCode;
    use tugextract_engine::{Diagnostic, Stage};

    #[test]
    fn validation_failures_are_invalid_arguments() {
        let result = RefactoringResult::failure(
            FailureKind::Validation,
            None,
            "invalid line range 3..=90 (document has 12 lines)",
            Vec::new(),
        );
        let err = extraction_failure(&result);
        assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        assert!(err.to_string().contains("invalid line range"));
    }

    #[test]
    fn splice_failures_are_resolution_errors() {
        let result = RefactoringResult::failure(
            FailureKind::Splice,
            Some(Stage::Generated),
            "no insertion point: document has only 1 line(s)",
            vec![
                Diagnostic::info("static_promoted", "promoted"),
                Diagnostic::warning("insertion_fallback", "fallback"),
            ],
        );
        let err = extraction_failure(&result);
        assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        let TugError::ExtractionFailed { details, .. } = err else {
            panic!("expected ExtractionFailed");
        };
        let details = details.unwrap();
        assert_eq!(details["completed_stage"], "generated");
        assert_eq!(details["diagnostics"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = read_failure(
            Path::new("/ws/Missing.cs"),
            "Missing.cs",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, TugError::FileNotFound { ref path } if path == "Missing.cs"));
        let err = write_failure("A.cs", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.error_code(), OutputErrorCode::ApplyError);
    }
}
