// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Request, analysis and result types shared by the extraction stages.
//!
//! Everything here is created, used and dropped within one extraction call.
//! [`RefactoringResult`] is the only value handed back to callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

/// What to extract and how to name it.
///
/// Lines are 1-based and inclusive. An empty `access_modifier` selects the
/// language default; `language` accepts the names understood by
/// [`crate::SourceLanguage::from_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub start_line: usize,
    pub end_line: usize,
    pub new_method_name: String,
    #[serde(default)]
    pub access_modifier: String,
    #[serde(default)]
    pub is_static: bool,
    pub language: String,
}

impl ExtractionRequest {
    pub fn new(
        start_line: usize,
        end_line: usize,
        new_method_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        ExtractionRequest {
            start_line,
            end_line,
            new_method_name: new_method_name.into(),
            access_modifier: String::new(),
            is_static: false,
            language: language.into(),
        }
    }

    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access_modifier = access.into();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

// ============================================================================
// Variables
// ============================================================================

/// How a variable crosses the boundary of the extracted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// Declared outside the range, its value flows in.
    Parameter,
    /// Declared inside the range at the range's block level.
    LocalDeclaration,
    /// Declared outside, written inside and read after the range.
    ExternalMutation,
    /// Referenced but not placed in any of the above.
    Unclassified,
}

/// One variable touched by the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInfo {
    pub name: String,
    pub inferred_type: Option<String>,
    pub role: VariableRole,
    /// Keyword that declared the variable inside the range (`var`, `let`, `const`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_keyword: Option<String>,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, inferred_type: Option<String>, role: VariableRole) -> Self {
        VariableInfo {
            name: name.into(),
            inferred_type,
            role,
            declaration_keyword: None,
        }
    }
}

/// How the call site binds the returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// Nothing is returned.
    #[default]
    None,
    /// Returned values are new locals at the call site.
    Declare,
    /// Returned values are assigned to existing variables.
    Assign,
}

/// Output of the variable flow analyzer.
///
/// `variables_to_return` is always a subset of `variables_to_declare` plus
/// `variables_to_assign`, in the order the values are written in the range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableHandlingMapping {
    pub parameters_to_pass: Vec<VariableInfo>,
    pub variables_to_declare: Vec<VariableInfo>,
    pub variables_to_assign: Vec<VariableInfo>,
    pub variables_to_return: Vec<VariableInfo>,
    pub suggested_return_type: String,
    pub return_kind: ReturnKind,
    /// Variables declared outside the range that the range only writes
    /// before reading; the new method declares them itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals_to_introduce: Vec<VariableInfo>,
}

impl VariableHandlingMapping {
    /// Parameterless, void mapping used when analysis cannot be trusted.
    pub fn fallback(void_type: &str) -> Self {
        VariableHandlingMapping {
            suggested_return_type: void_type.to_string(),
            ..Default::default()
        }
    }

    pub fn returns_nothing(&self) -> bool {
        self.variables_to_return.is_empty()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters_to_pass.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn return_names(&self) -> Vec<&str> {
        self.variables_to_return.iter().map(|v| v.name.as_str()).collect()
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Generated fragments, ready to splice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionPlan {
    pub signature_text: String,
    pub body_text: String,
    pub call_site_text: String,
    /// 0-based index into the modified line array where the method goes.
    pub insertion_line_index: usize,
    /// Complete method, including signature, braces and a leading blank line.
    pub method_text: String,
}

/// A whole-line edit in original-document coordinates.
///
/// `start_line` is 1-based. `removed == 0` inserts before `start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEdit {
    pub start_line: usize,
    pub removed: usize,
    pub inserted: Vec<String>,
}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable diagnostic codes.
pub mod codes {
    pub const MIXED_RETURNS: &str = "mixed_returns";
    pub const SCOPE_IMBALANCE: &str = "scope_imbalance";
    pub const ANALYSIS_FALLBACK: &str = "analysis_fallback";
    pub const TYPE_UNRESOLVED: &str = "type_unresolved";
    pub const CONTROL_FLOW: &str = "control_flow";
    pub const ASYNC_BOUNDARY: &str = "async_boundary";
    pub const STATIC_PROMOTED: &str = "static_promoted";
    pub const NAME_COLLISION: &str = "name_collision";
    pub const INSERTION_FALLBACK: &str = "insertion_fallback";
    pub const INSERTION_UNVERIFIED: &str = "insertion_unverified";
}

/// A finding recorded while extracting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn info(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)
    }
}

// ============================================================================
// Result
// ============================================================================

/// Which stage rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Generation,
    Splice,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Generation => "generation",
            FailureKind::Splice => "splice",
        }
    }
}

/// Pipeline stage, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validated,
    Analyzed,
    Generated,
    Spliced,
    Reported,
}

/// Outcome of one extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringResult {
    pub success: bool,
    pub message: String,
    pub modified_text: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Last stage completed.
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ExtractionPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<VariableHandlingMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<LineEdit>,
}

impl RefactoringResult {
    pub fn failure(
        kind: FailureKind,
        stage: Option<Stage>,
        message: impl Into<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        RefactoringResult {
            success: false,
            message: message.into(),
            modified_text: None,
            diagnostics,
            metadata: BTreeMap::new(),
            failure: Some(kind),
            stage,
            plan: None,
            mapping: None,
            edits: Vec::new(),
        }
    }

    pub fn has_diagnostic(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}
