// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Extract-method operation.
//!
//! Runs the pipeline as a linear state machine:
//!
//! 1. **Validated**: document, language, range, name and access modifier are
//!    checked, then the selection itself (non-empty, brace-balanced, no member
//!    or type headers, inside a member body)
//! 2. **Analyzed**: scope scan and variable flow; unreliable scopes degrade
//!    to a verbatim, parameterless method with diagnostics
//! 3. **Generated**: signature, body and call site
//! 4. **Spliced**: call site replaces the selection, method is inserted
//! 5. **Reported**: [`RefactoringResult`] with the modified text, edits,
//!    diagnostics and metadata
//!
//! See [`ExtractMethodEngine::extract`] for the entry point. Nothing here
//! touches the filesystem; [`ExtractMethodOutput`] packages a result for the
//! CLI and MCP front doors.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, info_span, warn};

use tugextract_core::output::{Summary, SCHEMA_VERSION};
use tugextract_core::patch::{MaterializedPatch, OutputEdit};
use tugextract_core::text::leading_whitespace;

use crate::call_site::{generate_call_site, receiver};
use crate::document::SourceDocument;
use crate::error::{ExtractMethodError, ExtractMethodResult};
use crate::flow::{analyze, FlowInput};
use crate::language::SourceLanguage;
use crate::scope::{AdapterCache, LanguageScopeAdapter, ScopeFrame, ScopeKind, ScopeScan};
use crate::signature::{
    generate_method, member_type_parameters, MethodLayout, SignatureParts, TypeParameter,
};
use crate::splice::{
    line_edits, replace_range, resolve_insertion, splice, verify_insertion, InsertionAnchors,
};
use crate::types::{
    codes, Diagnostic, ExtractionPlan, ExtractionRequest, RefactoringResult, Stage,
    VariableHandlingMapping,
};
use crate::validation::{is_valid_access_modifier, validate_method_name};

// ============================================================================
// Options
// ============================================================================

/// Engine-wide settings, usually resolved from configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Static-call receivers beyond the language defaults.
    pub known_static_types: HashSet<String>,
    /// Fail instead of degrading when the return set mixes new locals and
    /// reassigned variables.
    pub strict_mixed_returns: bool,
    /// Make the new method static when the enclosing member is.
    pub promote_static: bool,
    /// Access modifier for requests that leave it empty.
    pub default_access: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            known_static_types: HashSet::new(),
            strict_mixed_returns: false,
            promote_static: true,
            default_access: None,
        }
    }
}

impl EngineOptions {
    pub fn with_known_static_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_static_types
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_strict_mixed_returns(mut self, strict: bool) -> Self {
        self.strict_mixed_returns = strict;
        self
    }

    pub fn with_promote_static(mut self, promote: bool) -> Self {
        self.promote_static = promote;
        self
    }

    pub fn with_default_access(mut self, access: impl Into<String>) -> Self {
        self.default_access = Some(access.into());
        self
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A rejected request: the error plus what was gathered before it.
struct Rejection {
    error: ExtractMethodError,
    stage: Option<Stage>,
    diagnostics: Vec<Diagnostic>,
}

impl Rejection {
    fn at(
        stage: Option<Stage>,
        diagnostics: &[Diagnostic],
    ) -> impl FnOnce(ExtractMethodError) -> Self + '_ {
        move |error| Rejection {
            error,
            stage,
            diagnostics: diagnostics.to_vec(),
        }
    }
}

impl From<ExtractMethodError> for Rejection {
    fn from(error: ExtractMethodError) -> Self {
        Rejection {
            error,
            stage: None,
            diagnostics: Vec::new(),
        }
    }
}

/// Everything validation establishes about a request.
struct Validated {
    document: SourceDocument,
    language: SourceLanguage,
    adapter: Arc<LanguageScopeAdapter>,
    scan: ScopeScan,
    access: String,
}

/// Extract-method engine.
///
/// Owns its compiled language adapters. Not shared between threads; build
/// one engine per worker.
#[derive(Debug, Default)]
pub struct ExtractMethodEngine {
    options: EngineOptions,
    adapters: AdapterCache,
}

impl ExtractMethodEngine {
    pub fn new(options: EngineOptions) -> Self {
        ExtractMethodEngine {
            options,
            adapters: AdapterCache::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Drop compiled adapters; they are rebuilt on next use.
    pub fn clear_cache(&mut self) {
        self.adapters.clear();
    }

    /// Number of languages with a compiled adapter.
    pub fn cached_languages(&self) -> usize {
        self.adapters.len()
    }

    /// Extract `request`'s line range of `text` into a new method.
    ///
    /// Never fails: rejected requests come back as a result with
    /// `success == false`, no modified text, and the failing stage recorded.
    pub fn extract(&mut self, text: &str, request: &ExtractionRequest) -> RefactoringResult {
        let span = info_span!(
            "extract_method",
            method = %request.new_method_name,
            start = request.start_line,
            end = request.end_line,
            language = %request.language,
        );
        let _guard = span.enter();

        match self.run(text, request) {
            Ok(result) => {
                info!(
                    diagnostics = result.diagnostics.len(),
                    "extraction succeeded"
                );
                result
            }
            Err(rejection) => {
                let kind = rejection.error.failure_kind();
                warn!(failure = kind.as_str(), error = %rejection.error, "extraction rejected");
                RefactoringResult::failure(
                    kind,
                    rejection.stage,
                    rejection.error.to_string(),
                    rejection.diagnostics,
                )
            }
        }
    }

    fn run(
        &mut self,
        text: &str,
        request: &ExtractionRequest,
    ) -> Result<RefactoringResult, Rejection> {
        let v = self.validate(text, request)?;
        debug!(lines = v.document.line_count(), "request validated");

        let spec = v.language.spec();
        let (start, end) = (request.start_line, request.end_line);
        let scan = &v.scan;
        let mut diagnostics = Vec::new();

        // Analyzed
        let flow = analyze(&FlowInput {
            adapter: &v.adapter,
            scan,
            start_line: start,
            end_line: end,
            known_static_types: &self.options.known_static_types,
            strict_mixed_returns: self.options.strict_mixed_returns,
        })
        .map_err(Rejection::at(Some(Stage::Validated), &diagnostics))?;
        diagnostics.extend(flow.diagnostics.iter().cloned());
        let mapping = flow.mapping;

        let member = scan.enclosing_member(start);
        let outer_member = scan.outermost_member(start);
        let enclosing_type = scan.enclosing_type(start);
        let free_function = spec.free_functions && enclosing_type.is_none();

        let mut is_static = request.is_static;
        if !is_static && self.options.promote_static && !free_function {
            if let Some(m) = member.filter(|m| m.is_static) {
                is_static = true;
                diagnostics.push(Diagnostic::info(
                    codes::STATIC_PROMOTED,
                    format!("'{}' is static, so the new method is static too", m.name),
                ));
            }
        }
        if let Some(existing) = name_collision(scan, enclosing_type, &request.new_method_name) {
            diagnostics.push(Diagnostic::warning(
                codes::NAME_COLLISION,
                format!(
                    "a member named '{}' already exists at line {}",
                    request.new_method_name, existing
                ),
            ));
        }
        debug!(
            parameters = mapping.parameters_to_pass.len(),
            returns = mapping.variables_to_return.len(),
            fallback = flow.fallback,
            "selection analyzed"
        );

        // Generated
        let selected = &v.document.lines[start - 1..end];
        let layout =
            MethodLayout::from_member(&v.document.lines, outer_member, enclosing_type, spec);
        let access = if free_function { "" } else { v.access.as_str() };
        let type_parameters = type_parameters_in_scope(scan, member, outer_member);
        let parts = SignatureParts {
            name: &request.new_method_name,
            access,
            is_static,
            free_function,
            type_parameters: &type_parameters,
        };
        let method = generate_method(selected, &parts, &mapping, &layout, spec, flow.fallback)
            .map_err(Rejection::at(Some(Stage::Analyzed), &diagnostics))?;

        let call_indent = selected
            .iter()
            .find(|l| !l.trim().is_empty())
            .map(|l| leading_whitespace(l))
            .unwrap_or("");
        let type_name = enclosing_type.map(|t| t.name.as_str());
        let recv = receiver(spec, type_name, is_static, free_function);
        let call_mapping = if flow.fallback {
            VariableHandlingMapping::fallback(spec.types.void)
        } else {
            mapping.clone()
        };
        let call_lines = generate_call_site(
            &request.new_method_name,
            &recv,
            &call_mapping,
            call_indent,
            spec,
        )
        .map_err(Rejection::at(Some(Stage::Analyzed), &diagnostics))?;
        debug!(signature = %method.signature, "method generated");

        // Spliced
        let modified = replace_range(&v.document.lines, start, end, &call_lines);
        let removed = end - start + 1;
        let function_end = outer_member
            .filter(|_| free_function)
            .map(|f| scan.frame_last_line(f) + call_lines.len() - removed);
        let anchors = InsertionAnchors {
            type_line: enclosing_type.map(|t| t.start_line),
            function_end,
        };
        let point = resolve_insertion(&v.adapter, &modified, anchors)
            .map_err(Rejection::at(Some(Stage::Generated), &diagnostics))?;
        if point.strategy.is_fallback() {
            diagnostics.push(Diagnostic::warning(
                codes::INSERTION_FALLBACK,
                format!(
                    "enclosing type not found; method placed by {} strategy",
                    point.strategy
                ),
            ));
        }
        let final_lines = splice(&modified, point.index, &method.method_lines);
        // Blank separator at `index`, header right after it (1-based).
        let header_line = point.index + 2;
        if !verify_insertion(
            &v.adapter,
            &final_lines,
            header_line,
            &request.new_method_name,
            enclosing_type.map(|t| t.name.as_str()),
        ) {
            diagnostics.push(Diagnostic::warning(
                codes::INSERTION_UNVERIFIED,
                "could not confirm the new method's placement by re-scanning the result",
            ));
        }
        let modified_text = v.document.render(&final_lines);
        let edits = line_edits(start, end, &call_lines, point.index, &method.method_lines);
        debug!(index = point.index, strategy = %point.strategy, "method spliced");

        // Reported
        let mut metadata = BTreeMap::new();
        metadata.insert("linesExtracted".to_string(), json!(removed));
        metadata.insert("methodName".to_string(), json!(request.new_method_name));
        metadata.insert("startLine".to_string(), json!(start));
        metadata.insert("endLine".to_string(), json!(end));
        metadata.insert("accessModifier".to_string(), json!(access));
        metadata.insert("isStatic".to_string(), json!(is_static));
        metadata.insert("language".to_string(), json!(v.language.name()));
        metadata.insert("returnType".to_string(), json!(call_mapping.suggested_return_type));
        metadata.insert("parameterCount".to_string(), json!(call_mapping.parameters_to_pass.len()));
        metadata.insert("returnCount".to_string(), json!(call_mapping.variables_to_return.len()));
        metadata.insert("insertionLine".to_string(), json!(header_line));
        metadata.insert("insertionStrategy".to_string(), json!(point.strategy.as_str()));
        metadata.insert(
            "enclosingType".to_string(),
            json!(enclosing_type.map(|t| t.name.as_str())),
        );
        metadata.insert("enclosingMember".to_string(), json!(member.map(|m| m.name.as_str())));
        metadata.insert(
            "analysisMode".to_string(),
            json!(if flow.fallback { "fallback" } else { "full" }),
        );

        let plan = ExtractionPlan {
            signature_text: method.signature.clone(),
            body_text: method.body_text(),
            call_site_text: call_lines.join("\n"),
            insertion_line_index: point.index,
            method_text: format!("\n{}", method.method_text()),
        };

        Ok(RefactoringResult {
            success: true,
            message: format!(
                "Extracted lines {}-{} into {}",
                start, end, request.new_method_name
            ),
            modified_text: Some(modified_text),
            diagnostics,
            metadata,
            failure: None,
            stage: Some(Stage::Reported),
            plan: Some(plan),
            mapping: Some(call_mapping),
            edits,
        })
    }

    fn validate(
        &mut self,
        text: &str,
        request: &ExtractionRequest,
    ) -> Result<Validated, Rejection> {
        if text.trim().is_empty() {
            return Err(ExtractMethodError::EmptyDocument.into());
        }
        let language = SourceLanguage::from_name(&request.language).ok_or_else(|| {
            ExtractMethodError::UnsupportedLanguage {
                language: request.language.clone(),
            }
        })?;
        let document = SourceDocument::new(text, language);
        let (start, end) = (request.start_line, request.end_line);
        let line_count = document.line_count();
        if start == 0 || start > end || end > line_count {
            return Err(ExtractMethodError::InvalidRange {
                start,
                end,
                line_count,
            }
            .into());
        }
        validate_method_name(&request.new_method_name, language).map_err(ExtractMethodError::from)?;

        let requested = request.access_modifier.trim();
        if !is_valid_access_modifier(requested, language) {
            return Err(ExtractMethodError::InvalidAccessModifier {
                modifier: requested.to_string(),
                language: language.name().to_string(),
            }
            .into());
        }
        let spec = language.spec();
        let access = if !requested.is_empty() {
            requested.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            self.options
                .default_access
                .as_deref()
                .filter(|a| spec.accepts_access(a))
                .unwrap_or(spec.default_access)
                .to_string()
        };

        let adapter = self
            .adapters
            .get_or_build(language)
            .map_err(ExtractMethodError::from)?;
        let scan = adapter.scan(&document.lines);
        check_selection(&scan, start, end)?;

        Ok(Validated {
            document,
            language,
            adapter,
            scan,
            access,
        })
    }
}

/// Selection-level checks against the scope scan.
fn check_selection(scan: &ScopeScan, start: usize, end: usize) -> ExtractMethodResult<()> {
    if (start..=end).all(|line| scan.line(line).trim().is_empty()) {
        return Err(ExtractMethodError::EmptySelection);
    }
    scan.check_range_balance(start, end)
        .map_err(|line| ExtractMethodError::UnbalancedSelection { line })?;
    if let Some(frame) = scan
        .frames_starting_in(start, end)
        .into_iter()
        .find(|f| f.kind != ScopeKind::Block)
    {
        return Err(ExtractMethodError::ContainsDeclaration {
            kind: frame.kind.as_str().to_string(),
            line: frame.start_line,
        });
    }
    let innermost = scan.innermost(start, |f| f.kind != ScopeKind::Block);
    match innermost {
        Some(frame) if frame.kind.is_member() => Ok(()),
        // Scopes cannot be trusted; analysis falls back to a verbatim method.
        _ if !scan.balanced && scan.enclosing_member(start).is_some() => Ok(()),
        _ => Err(ExtractMethodError::NotInMemberBody),
    }
}

/// Type parameters declared by the members enclosing the selection, inner
/// member first. A name declared twice keeps the inner declaration.
fn type_parameters_in_scope(
    scan: &ScopeScan,
    member: Option<&ScopeFrame>,
    outer_member: Option<&ScopeFrame>,
) -> Vec<TypeParameter> {
    let outer = outer_member.filter(|o| Some(*o) != member);
    let mut params: Vec<TypeParameter> = Vec::new();
    for frame in member.into_iter().chain(outer) {
        for tp in member_type_parameters(&scan.header_text(frame), &frame.name) {
            if !params.iter().any(|p| p.name == tp.name) {
                params.push(tp);
            }
        }
    }
    params
}

/// Line of an existing member named `name` in the same type (or file, for
/// free functions).
fn name_collision(
    scan: &ScopeScan,
    enclosing_type: Option<&ScopeFrame>,
    name: &str,
) -> Option<usize> {
    scan.frames
        .iter()
        .filter(|f| f.kind.is_member() && f.name == name)
        .find(|f| match enclosing_type {
            Some(t) => {
                f.start_line > t.start_line
                    && f.start_line <= scan.frame_last_line(t)
                    && f.open_depth == t.open_depth + 1
            }
            None => true,
        })
        .map(|f| f.start_line)
}

// ============================================================================
// Output envelope
// ============================================================================

/// CLI/MCP response for an extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractMethodOutput {
    /// Status ("ok" or "failed").
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Workspace-relative file path.
    pub file: String,
    /// True when nothing was written.
    pub preview: bool,
    /// Engine result.
    pub result: RefactoringResult,
    /// Edits as byte-range patches with a unified diff.
    pub patch: MaterializedPatch,
    /// Patch size.
    pub summary: Summary,
    /// Backup of the original file (present when written).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<String>,
    /// Journal entry id usable with `tugx undo` (present when written).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_token: Option<String>,
    /// Files that were modified (present when written).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_written: Option<Vec<String>>,
}

impl ExtractMethodOutput {
    /// Package `result` for `file`, converting its line edits into a patch
    /// over `original`.
    pub fn new(file: impl Into<String>, original: &str, result: RefactoringResult) -> Self {
        let file = file.into();
        let ending = tugextract_core::text::LineEnding::detect(original);
        let edits: Vec<OutputEdit> = result
            .edits
            .iter()
            .map(|e| {
                OutputEdit::replace_lines(
                    file.clone(),
                    original,
                    e.start_line as u32,
                    e.removed as u32,
                    &e.inserted,
                    ending.as_str(),
                )
            })
            .collect();
        let patch = MaterializedPatch::from_edits(edits);
        let summary = Summary::from_patch(&patch);
        ExtractMethodOutput {
            status: if result.success { "ok" } else { "failed" }.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file,
            preview: true,
            result,
            patch,
            summary,
            backup_id: None,
            undo_token: None,
            files_written: None,
        }
    }

    /// Mark the output as written to disk.
    pub fn applied(mut self, backup_id: String, undo_token: String) -> Self {
        self.preview = false;
        self.files_written = Some(vec![self.file.clone()]);
        self.backup_id = Some(backup_id);
        self.undo_token = Some(undo_token);
        self
    }
}
