// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Extraction errors.
//!
//! Stages return `ExtractMethodResult`; the orchestrator turns an error into
//! a failed [`crate::RefactoringResult`] using [`ExtractMethodError::failure_kind`].
//! Errors never escape [`crate::ExtractMethodEngine::extract`].

use thiserror::Error;

use crate::types::FailureKind;
use crate::validation::ValidationError;

/// Errors that can occur during extract-method operations.
#[derive(Debug, Error)]
pub enum ExtractMethodError {
    /// Document has no content.
    #[error("document is empty")]
    EmptyDocument,

    /// Language tag not recognized.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    /// Range outside the document or reversed.
    #[error("invalid line range {start}..={end} (document has {line_count} lines)")]
    InvalidRange {
        start: usize,
        end: usize,
        line_count: usize,
    },

    /// Invalid method name.
    #[error("invalid name: {0}")]
    InvalidName(#[from] ValidationError),

    /// Access modifier not accepted by the language.
    #[error("access modifier '{modifier}' is not valid for {language}")]
    InvalidAccessModifier { modifier: String, language: String },

    /// Range holds only blank lines or comments.
    #[error("selection contains no statements")]
    EmptySelection,

    /// Range opens or closes a block it does not contain.
    #[error("selection splits a block at line {line}")]
    UnbalancedSelection { line: usize },

    /// Range contains a member or type declaration.
    #[error("selection contains a {kind} declaration at line {line}")]
    ContainsDeclaration { kind: String, line: usize },

    /// Range is not inside a method, constructor or function body.
    #[error("selection is not inside a method body")]
    NotInMemberBody,

    /// Return set mixes new locals and reassigned variables (strict mode).
    #[error(
        "selection both declares ({}) and reassigns ({}) variables used afterwards",
        declared.join(", "),
        assigned.join(", ")
    )]
    MixedReturns {
        declared: Vec<String>,
        assigned: Vec<String>,
    },

    /// Analysis could not produce a classification.
    #[error("analysis inconclusive: {reason}")]
    AnalysisInconclusive { reason: String },

    /// A generated fragment came out empty.
    #[error("generated {fragment} is empty")]
    EmptyFragment { fragment: String },

    /// No place to put the new method.
    #[error("no insertion point: {reason}")]
    NoInsertionPoint { reason: String },

    /// A language pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl ExtractMethodError {
    /// Stage that rejects a request with this error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ExtractMethodError::EmptyDocument
            | ExtractMethodError::UnsupportedLanguage { .. }
            | ExtractMethodError::InvalidRange { .. }
            | ExtractMethodError::InvalidName(_)
            | ExtractMethodError::InvalidAccessModifier { .. }
            | ExtractMethodError::EmptySelection
            | ExtractMethodError::UnbalancedSelection { .. }
            | ExtractMethodError::ContainsDeclaration { .. }
            | ExtractMethodError::NotInMemberBody
            | ExtractMethodError::MixedReturns { .. } => FailureKind::Validation,
            ExtractMethodError::AnalysisInconclusive { .. }
            | ExtractMethodError::EmptyFragment { .. }
            | ExtractMethodError::Pattern(_) => FailureKind::Generation,
            ExtractMethodError::NoInsertionPoint { .. } => FailureKind::Splice,
        }
    }
}

/// Result type for extract-method stages.
pub type ExtractMethodResult<T> = Result<T, ExtractMethodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ExtractMethodError::InvalidRange {
            start: 3,
            end: 40,
            line_count: 12,
        };
        assert_eq!(err.to_string(), "invalid line range 3..=40 (document has 12 lines)");

        let err = ExtractMethodError::MixedReturns {
            declared: vec!["x".into()],
            assigned: vec!["total".into(), "count".into()],
        };
        assert!(err.to_string().contains("declares (x)"));
        assert!(err.to_string().contains("reassigns (total, count)"));
    }

    #[test]
    fn failure_kinds() {
        assert_eq!(ExtractMethodError::EmptyDocument.failure_kind(), FailureKind::Validation);
        assert_eq!(
            ExtractMethodError::EmptyFragment {
                fragment: "body".into()
            }
            .failure_kind(),
            FailureKind::Generation
        );
        assert_eq!(
            ExtractMethodError::NoInsertionPoint {
                reason: "too short".into()
            }
            .failure_kind(),
            FailureKind::Splice
        );
    }

    #[test]
    fn validation_error_converts() {
        let err: ExtractMethodError = ValidationError::InvalidName {
            name: "1x".into(),
            reason: "must start with letter or underscore".into(),
        }
        .into();
        assert!(matches!(err, ExtractMethodError::InvalidName(_)));
        assert_eq!(err.failure_kind(), FailureKind::Validation);
    }
}
