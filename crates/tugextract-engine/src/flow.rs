// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Variable flow analysis.
//!
//! Classifies every variable referenced in the selected range relative to the
//! enclosing member body:
//!
//! - **Parameter**: declared outside the range and its value flows in (any
//!   read, or a write that is not an unconditional first assignment).
//! - **Local declaration**: declared at the range's own block level. It
//!   becomes a local of the new method and is returned when used after the
//!   range.
//! - **External mutation**: declared outside, written inside and read after
//!   the range before being overwritten. Returned and reassigned at the call
//!   site.
//!
//! "After the range" is the rest of the member body. When the range sits in
//! a loop, the loop header and the loop body before the range also count,
//! since the next iteration reaches them.
//!
//! Works on the sanitized lines of a [`ScopeScan`]; only the enclosing member
//! is tokenized.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::error::{ExtractMethodError, ExtractMethodResult};
use crate::patterns::{AnnotationStyle, LanguageSpec, TupleStyle};
use crate::scope::{FlowPatterns, LanguageScopeAdapter, ScopeFrame, ScopeKind, ScopeScan};
use crate::typeinfer::{clean_type, infer_type};
use crate::types::{
    codes, Diagnostic, ReturnKind, VariableHandlingMapping, VariableInfo, VariableRole,
};

// ============================================================================
// Public API
// ============================================================================

/// Inputs for one analysis.
#[derive(Debug)]
pub struct FlowInput<'a> {
    pub adapter: &'a LanguageScopeAdapter,
    pub scan: &'a ScopeScan,
    pub start_line: usize,
    pub end_line: usize,
    /// Receivers of static calls, in addition to the language defaults.
    pub known_static_types: &'a HashSet<String>,
    /// Reject mixed declare/assign return sets instead of degrading.
    pub strict_mixed_returns: bool,
}

/// Analysis outcome.
#[derive(Debug, Clone)]
pub struct FlowAnalysis {
    pub mapping: VariableHandlingMapping,
    pub diagnostics: Vec<Diagnostic>,
    /// Classification was skipped; the mapping is parameterless and void.
    pub fallback: bool,
}

/// Classify the variables of `input.start_line..=input.end_line`.
///
/// Only a mixed return set under `strict_mixed_returns` is an error. A
/// document whose braces do not balance yields the fallback mapping.
pub fn analyze(input: &FlowInput<'_>) -> ExtractMethodResult<FlowAnalysis> {
    let spec = input.adapter.spec();
    if !input.scan.balanced {
        debug!(
            start = input.start_line,
            end = input.end_line,
            "braces unbalanced, using fallback classification"
        );
        return Ok(FlowAnalysis {
            mapping: VariableHandlingMapping::fallback(spec.types.void),
            diagnostics: vec![
                Diagnostic::warning(
                    codes::SCOPE_IMBALANCE,
                    "document braces do not balance; scope information is unreliable",
                ),
                Diagnostic::warning(
                    codes::ANALYSIS_FALLBACK,
                    "variable analysis skipped; the block is extracted verbatim as a \
                     parameterless void method",
                ),
            ],
            fallback: true,
        });
    }
    Analyzer::new(input).run()
}

// ============================================================================
// Occurrences and declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    ReadWrite,
}

#[derive(Debug, Clone)]
struct Occurrence {
    name: String,
    line: usize,
    col: usize,
    depth: usize,
    access: Access,
}

impl Occurrence {
    fn pos(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    fn writes(&self) -> bool {
        matches!(self.access, Access::Write | Access::ReadWrite)
    }
}

#[derive(Debug, Clone)]
struct Declaration {
    name: String,
    line: usize,
    col: usize,
    depth: usize,
    declared_type: Option<String>,
    keyword: Option<String>,
    initializer: Option<String>,
    /// Scoped to a `for`/`foreach`/`using`/`catch` statement, not the block.
    header_scoped: bool,
}

impl Declaration {
    fn pos(&self) -> (usize, usize) {
        (self.line, self.col)
    }
}

/// Statement keywords whose parenthesized declarations do not leak out.
const HEADER_SCOPE_KEYWORDS: &[&str] =
    &["for", "foreach", "while", "using", "catch", "fixed", "lock"];

const COMPOUND_OPERATORS: &[&str] = &[
    "<<=", ">>=", "??=", "**=", "||=", "&&=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
];

// ============================================================================
// Text helpers
// ============================================================================

fn prev_char(text: &str, col: usize) -> Option<char> {
    text.get(..col)?.chars().rev().find(|c| !c.is_whitespace())
}

fn prev_word(text: &str, col: usize) -> Option<&str> {
    let before = text.get(..col)?.trim_end();
    let start = before
        .char_indices()
        .rev()
        .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let word = &before[start..];
    (!word.is_empty()).then_some(word)
}

fn rest_after(text: &str, end: usize) -> &str {
    text.get(end..).unwrap_or("").trim_start()
}

fn paren_depth(text: &str) -> i32 {
    text.chars().fold(0, |d, c| match c {
        '(' => d + 1,
        ')' => d - 1,
        _ => d,
    })
}

fn is_plain_assignment(rest: &str) -> bool {
    rest.starts_with('=') && !rest.starts_with("==") && !rest.starts_with("=>")
}

/// Split at `sep` outside of brackets.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[last..i]);
                last = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[last..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// Byte range inside `(a, b) =` or `[a, b] =` at statement start.
fn destructuring_assignment(text: &str) -> Option<(usize, usize)> {
    let trimmed_start = text.len() - text.trim_start().len();
    let open = text[trimmed_start..].chars().next()?;
    let close = match open {
        '(' => ')',
        '[' => ']',
        _ => return None,
    };
    let mut depth = 0;
    for (i, ch) in text[trimmed_start..].char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let close_at = trimmed_start + i;
                let rest = rest_after(text, close_at + 1);
                return is_plain_assignment(rest).then_some((trimmed_start + 1, close_at));
            }
        }
    }
    None
}

/// Initializer text after the `=` that follows `from`, up to `;`.
fn initializer_after(text: &str, from: usize) -> Option<String> {
    let tail = text.get(from..)?;
    let mut offset = 0;
    loop {
        let eq = tail[offset..].find('=')? + offset;
        let after = &tail[eq + 1..];
        let before_ok = eq == 0 || !tail[..eq].ends_with(['=', '!', '<', '>']);
        if before_ok && !after.starts_with('=') && !after.starts_with('>') {
            let mut depth = 0i32;
            let mut stop = after.len();
            for (i, ch) in after.char_indices() {
                match ch {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth -= 1,
                    ';' | ',' if depth == 0 => {
                        stop = i;
                        break;
                    }
                    _ => {}
                }
                if depth < 0 {
                    stop = i;
                    break;
                }
            }
            let init = after[..stop].trim();
            return (!init.is_empty()).then(|| init.to_string());
        }
        offset = eq + 1;
    }
}

/// Names inside a destructuring list: `a, b: c, ...rest, [d = 1]`.
fn destructured_names(list: &str, spec: &LanguageSpec) -> Vec<(String, usize)> {
    let mut names = Vec::new();
    let mut offset = 0;
    for part in list.split(',') {
        let part_offset = offset;
        offset += part.len() + 1;
        let target = match part.find(':') {
            Some(i) if spec.annotation == AnnotationStyle::Suffix => &part[i + 1..],
            _ => part,
        };
        let target = target.split('=').next().unwrap_or("");
        let Some(word) = target
            .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .filter(|w| !w.is_empty())
            .last()
        else {
            continue;
        };
        if spec.is_keyword(word) && !spec.is_type_keyword(word) {
            continue;
        }
        if let Some(pos) = part.rfind(word) {
            names.push((word.to_string(), part_offset + pos));
        }
    }
    names
}

/// One parameter as written in a header or lambda: names and optional type.
fn parse_parameter(param: &str, spec: &LanguageSpec) -> Vec<(String, Option<String>)> {
    let mut text = param.trim();
    while text.starts_with('[') {
        match text.find(']') {
            Some(i) => text = text[i + 1..].trim_start(),
            None => return Vec::new(),
        }
    }
    match spec.annotation {
        AnnotationStyle::Prefix => {
            let left = split_top_level(text, '=').first().copied().unwrap_or("");
            let words: Vec<&str> = left
                .split_whitespace()
                .filter(|w| {
                    !matches!(*w, "this" | "ref" | "out" | "in" | "params" | "scoped" | "readonly")
                })
                .collect();
            let Some((name, ty)) = words.split_last() else {
                return Vec::new();
            };
            let name = name.trim_start_matches('@');
            if name.is_empty() || spec.is_keyword(name) {
                return Vec::new();
            }
            vec![(name.to_string(), clean_type(&ty.join(" ")))]
        }
        AnnotationStyle::Suffix => {
            let mut words: Vec<&str> = text.split_whitespace().collect();
            while words
                .first()
                .is_some_and(|w| {
                    matches!(*w, "public" | "private" | "protected" | "readonly" | "override")
                })
            {
                words.remove(0);
            }
            let text = words.join(" ");
            let text = text.trim_start_matches("...");
            if text.starts_with('{') || text.starts_with('[') {
                let inner_end = text.rfind(['}', ']']).unwrap_or(text.len());
                return destructured_names(&text[1..inner_end], spec)
                    .into_iter()
                    .map(|(n, _)| (n, None))
                    .collect();
            }
            let parts = split_top_level(text, ':');
            let name_part = parts.first().copied().unwrap_or("");
            let name = name_part
                .split('=')
                .next()
                .unwrap_or("")
                .trim()
                .trim_end_matches('?');
            if name.is_empty() || name == "this" || spec.is_keyword(name) {
                return Vec::new();
            }
            let ty = parts
                .get(1)
                .map(|t| t.split('=').next().unwrap_or("").trim())
                .and_then(clean_type);
            vec![(name.to_string(), ty)]
        }
    }
}

/// Parameters of a member header: the parenthesized list after its name.
fn parse_member_parameters(
    header: &str,
    name: &str,
    spec: &LanguageSpec,
) -> Vec<(String, Option<String>)> {
    let search_from = header.find(name).map(|i| i + name.len()).unwrap_or(0);
    let Some(open_rel) = header[search_from..].find('(') else {
        return Vec::new();
    };
    let open = search_from + open_rel;
    let mut depth = 0;
    let mut close = None;
    for (i, ch) in header[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return Vec::new();
    };
    split_top_level(&header[open + 1..close], ',')
        .into_iter()
        .flat_map(|p| parse_parameter(p, spec))
        .collect()
}

// ============================================================================
// Analyzer
// ============================================================================

struct Analyzer<'a> {
    input: &'a FlowInput<'a>,
    spec: &'static LanguageSpec,
    patterns: &'a FlowPatterns,
    scan: &'a ScopeScan,
    start: usize,
    end: usize,
    base_depth: usize,
    view_start: usize,
    view_end: usize,
    member: Option<&'a ScopeFrame>,
    member_params: Vec<(String, Option<String>)>,
    declarations: Vec<Declaration>,
    /// Byte ranges on each line that hold a declared type.
    type_spans: HashMap<usize, Vec<(usize, usize)>>,
    known: HashSet<String>,
    fields: HashSet<String>,
    module_symbols: HashSet<String>,
    lambda_params: HashSet<String>,
    occurrences: Vec<Occurrence>,
}

impl<'a> Analyzer<'a> {
    fn new(input: &'a FlowInput<'a>) -> Self {
        let scan = input.scan;
        let spec = input.adapter.spec();
        let member = scan.enclosing_member(input.start_line);
        let (view_start, view_end, member_params) = match member {
            Some(m) => {
                let mut params = parse_member_parameters(&scan.header_text(m), &m.name, spec);
                if spec.implicit_member_access && matches!(m.name.as_str(), "set" | "init") {
                    params.push(("value".to_string(), None));
                }
                (
                    (m.body_line + 1).min(input.start_line),
                    scan.frame_last_line(m),
                    params,
                )
            }
            None => (1, scan.line_count(), Vec::new()),
        };
        Analyzer {
            input,
            spec,
            patterns: input.adapter.flow_patterns(),
            scan,
            start: input.start_line,
            end: input.end_line,
            base_depth: scan.depth_before(input.start_line),
            view_start,
            view_end,
            member,
            member_params,
            declarations: Vec::new(),
            type_spans: HashMap::new(),
            known: HashSet::new(),
            fields: HashSet::new(),
            module_symbols: HashSet::new(),
            lambda_params: HashSet::new(),
            occurrences: Vec::new(),
        }
    }

    fn run(mut self) -> ExtractMethodResult<FlowAnalysis> {
        for line in self.view_start..=self.view_end {
            let (found, spans) = self.collect_declarations(line);
            self.declarations.extend(found);
            if !spans.is_empty() {
                self.type_spans.insert(line, spans);
            }
        }
        self.known = self
            .declarations
            .iter()
            .map(|d| d.name.clone())
            .chain(self.member_params.iter().map(|(n, _)| n.clone()))
            .collect();
        self.collect_fields();
        self.collect_module_symbols();
        self.collect_lambda_params();
        for line in self.view_start..=self.view_end {
            self.collect_occurrences(line);
        }
        debug!(
            declarations = self.declarations.len(),
            occurrences = self.occurrences.len(),
            "tokenized member body"
        );
        self.classify()
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    fn header_scoped(&self, text: &str, col: usize) -> bool {
        let head = text.trim_start().trim_start_matches('}').trim_start();
        let keyword = head
            .split(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");
        HEADER_SCOPE_KEYWORDS.contains(&keyword) && paren_depth(&text[..col]) > 0
    }

    /// Declarations on one line, plus the byte ranges of their written types.
    fn collect_declarations(&self, line: usize) -> (Vec<Declaration>, Vec<(usize, usize)>) {
        let scan = self.scan;
        let text = scan.line(line);
        let spec = self.spec;
        let mut found: Vec<Declaration> = Vec::new();
        let mut spans = Vec::new();
        let make = |name: &str,
                    col: usize,
                    ty: Option<String>,
                    kw: Option<String>,
                    init: Option<String>,
                    scoped: bool| Declaration {
            name: name.trim_start_matches('@').to_string(),
            line,
            col,
            depth: scan.depth_at(line, col),
            declared_type: ty,
            keyword: kw,
            initializer: init,
            header_scoped: scoped,
        };

        for caps in self.patterns.declaration.captures_iter(text) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            let bare = name.as_str().trim_start_matches('@');
            if spec.is_keyword(bare) {
                continue;
            }
            let ty = caps.name("ty");
            if spec.annotation == AnnotationStyle::Prefix {
                let Some(ty) = ty else {
                    continue;
                };
                let first = ty
                    .as_str()
                    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .find(|w| !w.is_empty())
                    .unwrap_or("");
                if spec.is_keyword(first) && !spec.is_type_keyword(first) {
                    continue;
                }
            }
            if let Some(ty) = ty {
                spans.push((ty.start(), ty.end()));
            }
            let declared = ty.and_then(|t| clean_type(t.as_str()));
            let keyword = caps
                .name("kw")
                .map(|k| k.as_str().to_string())
                .or_else(|| (declared.is_none() && ty.is_some()).then(|| "var".to_string()));
            let init = initializer_after(text, name.end());
            let scoped = self.header_scoped(text, name.start());
            found.push(make(name.as_str(), name.start(), declared, keyword, init, scoped));
        }

        for re in &self.patterns.destructuring {
            for caps in re.captures_iter(text) {
                let (Some(kw), Some(list)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let scoped = self.header_scoped(text, list.start());
                for (name, offset) in destructured_names(list.as_str(), spec) {
                    found.push(make(
                        &name,
                        list.start() + offset,
                        None,
                        Some(kw.as_str().to_string()),
                        None,
                        scoped,
                    ));
                }
            }
        }

        let bindings = [
            Some(&self.patterns.catch_binding),
            self.patterns.pattern_binding.as_ref(),
            self.patterns.out_binding.as_ref(),
        ];
        for (i, re) in bindings.into_iter().enumerate() {
            let Some(re) = re else {
                continue;
            };
            for caps in re.captures_iter(text) {
                let Some(name) = caps.name("name") else {
                    continue;
                };
                if spec.is_keyword(name.as_str()) {
                    continue;
                }
                let ty = caps.name("ty");
                if let Some(ty) = ty {
                    spans.push((ty.start(), ty.end()));
                }
                let scoped = i == 0 || self.header_scoped(text, name.start());
                found.push(make(
                    name.as_str(),
                    name.start(),
                    ty.and_then(|t| clean_type(t.as_str())),
                    None,
                    None,
                    scoped,
                ));
            }
        }

        found.sort_by_key(|d| d.col);
        found.dedup_by_key(|d| d.col);
        (found, spans)
    }

    /// Fields and properties of the enclosing type (implicit member access only).
    fn collect_fields(&mut self) {
        let (scan, patterns) = (self.scan, self.patterns);
        let Some(re) = &patterns.field else {
            return;
        };
        let Some(ty) = scan.enclosing_type(self.start) else {
            return;
        };
        let member_depth = ty.open_depth + 1;
        for line in ty.body_line + 1..scan.frame_last_line(ty) {
            if scan.depth_before(line) != member_depth {
                continue;
            }
            if let Some(name) = re.captures(scan.line(line)).and_then(|c| c.get(1)) {
                self.fields.insert(name.as_str().trim_start_matches('@').to_string());
            }
        }
    }

    /// Imports and top-level bindings, which are not passed around.
    fn collect_module_symbols(&mut self) {
        let (scan, patterns) = (self.scan, self.patterns);
        let Some(re) = &patterns.module_symbol else {
            return;
        };
        if self.member.is_none() {
            return;
        }
        for line in 1..=scan.line_count() {
            if scan.depth_before(line) != 0 {
                continue;
            }
            let Some(caps) = re.captures(scan.line(line)) else {
                continue;
            };
            if let Some(clause) = caps.get(1) {
                for part in clause.as_str().split(',') {
                    let word = part
                        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                        .filter(|w| !w.is_empty())
                        .last();
                    if let Some(word) = word {
                        self.module_symbols.insert(word.to_string());
                    }
                }
            }
            for group in [caps.get(2), caps.get(3)].into_iter().flatten() {
                self.module_symbols.insert(group.as_str().to_string());
            }
        }
    }

    fn collect_lambda_params(&mut self) {
        let (scan, patterns) = (self.scan, self.patterns);
        for line in self.start..=self.end {
            let text = scan.line(line);
            for caps in patterns.lambda_single.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    let name = name.as_str().trim_start_matches('@');
                    if !self.spec.is_keyword(name) {
                        self.lambda_params.insert(name.to_string());
                    }
                }
            }
            for caps in patterns.lambda_list.captures_iter(text) {
                let Some(list) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                for param in split_top_level(list.as_str(), ',') {
                    let parsed = parse_parameter(param, self.spec);
                    let names: Vec<String> = if parsed.is_empty() {
                        param.split_whitespace().last().map(str::to_string).into_iter().collect()
                    } else {
                        parsed.into_iter().map(|(n, _)| n).collect()
                    };
                    self.lambda_params.extend(names);
                }
            }
        }
        // A lambda parameter that is also a real declaration in range is a local.
        let declared_in_range: HashSet<&str> = self
            .declarations
            .iter()
            .filter(|d| d.line >= self.start && d.line <= self.end)
            .map(|d| d.name.as_str())
            .collect();
        self.lambda_params.retain(|n| !declared_in_range.contains(n.as_str()));
    }

    fn is_candidate(&self, text: &str, line: usize, col: usize, end: usize, name: &str) -> bool {
        let spec = self.spec;
        if spec.is_keyword(name) || spec.is_builtin(name) {
            return false;
        }
        if spec.known_static_types.contains(&name) || self.input.known_static_types.contains(name) {
            return false;
        }
        let known = self.known.contains(name);
        if let Some(prev) = prev_char(text, col) {
            if prev == '.' {
                let before = text[..col].trim_end();
                if !before.ends_with("..") {
                    return false;
                }
            }
            if prev == '#' {
                return false;
            }
        }
        if matches!(prev_word(text, col), Some("new" | "is" | "as" | "instanceof")) {
            return false;
        }
        if let Some(spans) = self.type_spans.get(&line) {
            if spans.iter().any(|&(s, e)| col >= s && col < e) {
                return false;
            }
        }
        let rest = rest_after(text, end);
        if rest.starts_with('(') && !known {
            return false;
        }
        if rest.starts_with('<') && !known && !rest.starts_with("<=") && !rest.starts_with("<<") {
            // Generic call or type argument list.
            let closes = rest.find('>').is_some_and(|i| {
                !rest[..i].contains([' ', '=']) || rest[i + 1..].trim_start().starts_with('(')
            });
            if closes {
                return false;
            }
        }
        // Object keys, named arguments and labels.
        if rest.starts_with(':')
            && !rest.starts_with("::")
            && matches!(prev_char(text, col), None | Some('{' | ',' | '('))
        {
            return false;
        }
        if self.lambda_params.contains(name) && line >= self.start && line <= self.end {
            return false;
        }
        if known {
            return true;
        }
        if spec.implicit_member_access && (name.starts_with('_') || self.fields.contains(name)) {
            return false;
        }
        if self.module_symbols.contains(name) {
            return false;
        }
        if name.chars().next().is_some_and(char::is_uppercase) {
            return false;
        }
        true
    }

    fn access_at(
        &self,
        text: &str,
        col: usize,
        end: usize,
        destructure: Option<(usize, usize)>,
    ) -> Access {
        let rest = rest_after(text, end);
        if rest.starts_with("++") || rest.starts_with("--") {
            return Access::ReadWrite;
        }
        let before = text[..col].trim_end();
        if before.ends_with("++") || before.ends_with("--") {
            return Access::ReadWrite;
        }
        if COMPOUND_OPERATORS.iter().any(|op| rest.starts_with(op)) {
            return Access::ReadWrite;
        }
        if is_plain_assignment(rest) {
            return Access::Write;
        }
        match prev_word(text, col) {
            Some("out") => return Access::Write,
            Some("ref") => return Access::ReadWrite,
            _ => {}
        }
        if let Some((s, e)) = destructure {
            if col >= s && end <= e {
                return Access::Write;
            }
        }
        Access::Read
    }

    fn collect_occurrences(&mut self, line: usize) {
        let (scan, patterns) = (self.scan, self.patterns);
        let text = scan.line(line);
        let destructure = destructuring_assignment(text);
        let decl_cols: HashSet<usize> = self
            .declarations
            .iter()
            .filter(|d| d.line == line)
            .map(|d| d.col)
            .collect();
        let mut found = Vec::new();
        for m in patterns.identifier.find_iter(text) {
            let (col, end) = (m.start(), m.end());
            if text[..col]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
            {
                continue;
            }
            let name = m.as_str().trim_start_matches('@');
            let is_decl = decl_cols.contains(&col);
            if !is_decl && !self.is_candidate(text, line, col, end, name) {
                continue;
            }
            let access = if is_decl {
                Access::Write
            } else {
                self.access_at(text, col, end, destructure)
            };
            found.push(Occurrence {
                name: name.to_string(),
                line,
                col,
                depth: scan.depth_at(line, col),
                access,
            });
        }
        self.occurrences.extend(found);
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    fn occurrences_of<'s>(
        &'s self,
        name: &'s str,
        lines: std::ops::RangeInclusive<usize>,
    ) -> impl Iterator<Item = &'s Occurrence> + 's {
        self.occurrences
            .iter()
            .filter(move |o| o.name == name && lines.contains(&o.line))
    }

    /// Read before being overwritten at or above the range's depth.
    fn read_before_overwrite<'s>(&self, seq: impl Iterator<Item = &'s Occurrence>) -> bool {
        for occ in seq {
            match occ.access {
                Access::Read | Access::ReadWrite => return true,
                Access::Write if occ.depth <= self.base_depth => return false,
                Access::Write => {}
            }
        }
        false
    }

    /// Frames open around the range, excluding ones the range itself opens.
    fn frames_around_range(&self) -> Vec<&'a ScopeFrame> {
        let scan = self.scan;
        scan.enclosing_frames(self.start)
            .into_iter()
            .filter(|f| f.start_line < self.start)
            .collect()
    }

    fn enclosing_loop(&self) -> Option<&'a ScopeFrame> {
        let member_start = self.member.map(|m| m.start_line).unwrap_or(0);
        self.frames_around_range().into_iter().rev().find(|f| {
            f.kind == ScopeKind::Block
                && f.start_line >= member_start
                && self.spec.is_loop_keyword(f.name.as_str())
        })
    }

    fn read_after_range(&self, name: &str) -> bool {
        if self.end < self.view_end {
            let straight = self.occurrences_of(name, self.end + 1..=self.view_end);
            if self.read_before_overwrite(straight) {
                return true;
            }
        }
        if let Some(lp) = self.enclosing_loop() {
            let loop_end = self.scan.frame_last_line(lp);
            let rest_of_loop = self.occurrences_of(name, self.end + 1..=loop_end);
            let wrapped = self.occurrences_of(name, lp.start_line..=self.start.saturating_sub(1));
            if self.read_before_overwrite(rest_of_loop.chain(wrapped)) {
                return true;
            }
        }
        false
    }

    fn block_end(&self) -> usize {
        self.frames_around_range()
            .last()
            .map(|f| self.scan.frame_last_line(f))
            .unwrap_or(self.view_end)
            .min(self.view_end)
    }

    fn known_types(&self) -> HashMap<String, String> {
        let mut types = HashMap::new();
        for (name, ty) in &self.member_params {
            if let Some(ty) = ty {
                types.insert(name.clone(), ty.clone());
            }
        }
        for decl in &self.declarations {
            if let Some(ty) = &decl.declared_type {
                types.insert(decl.name.clone(), ty.clone());
            }
        }
        types
    }

    fn resolve_type(
        &self,
        name: &str,
        decl: Option<&Declaration>,
        known: &HashMap<String, String>,
    ) -> Option<String> {
        let param_type = self
            .member_params
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, t)| t.clone());
        let declared = decl.and_then(|d| d.declared_type.clone()).or(param_type);
        infer_type(
            declared.as_deref(),
            decl.and_then(|d| d.initializer.as_deref()),
            name,
            self.spec,
            |other| known.get(other).cloned(),
        )
    }

    fn classify(self) -> ExtractMethodResult<FlowAnalysis> {
        let spec = self.spec;
        let mut diagnostics = Vec::new();
        let known_types = self.known_types();
        let block_end = self.block_end();

        // Names referenced in range, in order of first occurrence.
        let mut names: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for occ in self.occurrences_of_range() {
            if seen.insert(occ.name.as_str()) {
                names.push(occ.name.as_str());
            }
        }

        let mut parameters: Vec<(usize, usize, VariableInfo)> = Vec::new();
        let mut declared: Vec<((usize, usize), VariableInfo)> = Vec::new();
        let mut returned: Vec<((usize, usize), VariableInfo)> = Vec::new();
        let mut assigned: Vec<((usize, usize), VariableInfo)> = Vec::new();
        let mut introduced: Vec<((usize, usize), VariableInfo)> = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();

        let mut typed = |name: &str, ty: Option<String>, role: VariableRole| {
            let ty = match ty {
                Some(ty) => ty,
                None => {
                    unresolved.push(name.to_string());
                    spec.types.object.to_string()
                }
            };
            VariableInfo::new(name, Some(ty), role)
        };

        for name in names {
            let in_range: Vec<&Occurrence> =
                self.occurrences_of(name, self.start..=self.end).collect();
            let range_decls: Vec<&Declaration> = self
                .declarations
                .iter()
                .filter(|d| d.name == name && d.line >= self.start && d.line <= self.end)
                .collect();

            if !range_decls.is_empty() {
                let Some(decl) = range_decls
                    .iter()
                    .find(|d| d.depth == self.base_depth && !d.header_scoped)
                else {
                    continue;
                };
                let ty = self.resolve_type(name, Some(*decl), &known_types);
                let mut info = typed(name, ty, VariableRole::LocalDeclaration);
                info.declaration_keyword = decl.keyword.clone();
                let used_after = self.end < block_end
                    && self.occurrences_of(name, self.end + 1..=block_end).next().is_some();
                if used_after {
                    returned.push((decl.pos(), info.clone()));
                }
                declared.push((decl.pos(), info));
                continue;
            }

            let Some(first) = in_range.first() else {
                continue;
            };
            // `x = x + 1` reads before it writes.
            let clean_first_write = first.access == Access::Write
                && first.depth <= self.base_depth
                && !in_range
                    .iter()
                    .any(|o| o.line == first.line && o.access != Access::Write);
            let flows_in = !clean_first_write;
            let first_write = in_range.iter().find(|o| o.writes()).map(|o| o.pos());
            let outer_decl = self
                .declarations
                .iter()
                .filter(|d| d.name == name && d.line < self.start)
                .last();
            let ty = self.resolve_type(name, outer_decl, &known_types);

            if flows_in {
                let param = typed(name, ty.clone(), VariableRole::Parameter);
                parameters.push((first.line, first.col, param));
            }
            if let Some(pos) = first_write {
                if !flows_in {
                    introduced.push((pos, typed(name, ty.clone(), VariableRole::LocalDeclaration)));
                }
                if self.read_after_range(name) {
                    assigned.push((pos, typed(name, ty, VariableRole::ExternalMutation)));
                }
            }
        }

        parameters.sort_by_key(|(l, c, _)| (*l, *c));
        let mut all_returns: Vec<((usize, usize), VariableInfo, ReturnKind)> = returned
            .iter()
            .map(|(p, v)| (*p, v.clone(), ReturnKind::Declare))
            .chain(assigned.iter().map(|(p, v)| (*p, v.clone(), ReturnKind::Assign)))
            .collect();
        all_returns.sort_by_key(|(p, _, _)| *p);

        let has_declare = all_returns.iter().any(|(_, _, k)| *k == ReturnKind::Declare);
        let has_assign = all_returns.iter().any(|(_, _, k)| *k == ReturnKind::Assign);
        let return_kind = match (has_declare, has_assign) {
            (false, false) => ReturnKind::None,
            (true, false) => ReturnKind::Declare,
            (false, true) => ReturnKind::Assign,
            (true, true) => {
                let declared_names: Vec<String> =
                    returned.iter().map(|(_, v)| v.name.clone()).collect();
                let assigned_names: Vec<String> =
                    assigned.iter().map(|(_, v)| v.name.clone()).collect();
                if self.input.strict_mixed_returns {
                    return Err(ExtractMethodError::MixedReturns {
                        declared: declared_names,
                        assigned: assigned_names,
                    });
                }
                diagnostics.push(Diagnostic::warning(
                    codes::MIXED_RETURNS,
                    format!(
                        "selection declares ({}) and reassigns ({}); all returned values are \
                         bound by assignment, declare the new locals before the call",
                        declared_names.join(", "),
                        assigned_names.join(", ")
                    ),
                ));
                ReturnKind::Assign
            }
        };

        let variables_to_return: Vec<VariableInfo> =
            all_returns.into_iter().map(|(_, v, _)| v).collect();
        let suggested_return_type = return_type(&variables_to_return, spec);

        if !unresolved.is_empty() {
            unresolved.sort();
            unresolved.dedup();
            diagnostics.push(Diagnostic::info(
                codes::TYPE_UNRESOLVED,
                format!(
                    "no type evidence for {}; using {}",
                    unresolved.join(", "),
                    spec.types.object
                ),
            ));
        }
        diagnostics.extend(self.control_flow_diagnostics());

        let mapping = VariableHandlingMapping {
            parameters_to_pass: parameters.into_iter().map(|(_, _, v)| v).collect(),
            variables_to_declare: declared.into_iter().map(|(_, v)| v).collect(),
            variables_to_assign: assigned.into_iter().map(|(_, v)| v).collect(),
            variables_to_return,
            suggested_return_type,
            return_kind,
            locals_to_introduce: introduced.into_iter().map(|(_, v)| v).collect(),
        };
        debug!(
            parameters = mapping.parameters_to_pass.len(),
            returns = mapping.variables_to_return.len(),
            return_type = %mapping.suggested_return_type,
            "classified variables"
        );
        Ok(FlowAnalysis {
            mapping,
            diagnostics,
            fallback: false,
        })
    }

    fn occurrences_of_range(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(move |o| o.line >= self.start && o.line <= self.end)
    }

    fn control_flow_diagnostics(&self) -> Vec<Diagnostic> {
        let contained: Vec<&ScopeFrame> = self
            .scan
            .frames_starting_in(self.start, self.end)
            .into_iter()
            .filter(|f| {
                f.kind == ScopeKind::Block
                    && (self.spec.is_loop_keyword(&f.name) || f.name == "switch")
            })
            .collect();
        let mut found: BTreeMap<&'static str, Diagnostic> = BTreeMap::new();
        for line in self.start..=self.end {
            let text = self.scan.line(line);
            for m in self.patterns.identifier.find_iter(text) {
                if prev_char(text, m.start()) == Some('.') {
                    continue;
                }
                match m.as_str() {
                    "return" | "yield" | "goto" => {
                        found.entry("exit").or_insert_with(|| {
                            Diagnostic::warning(
                                codes::CONTROL_FLOW,
                                format!(
                                    "'{}' at line {} now leaves only the extracted method",
                                    m.as_str(),
                                    line
                                ),
                            )
                        });
                    }
                    "break" | "continue" => {
                        let inside = contained.iter().any(|f| f.encloses(line));
                        if !inside {
                            found.entry("jump").or_insert_with(|| {
                                Diagnostic::warning(
                                    codes::CONTROL_FLOW,
                                    format!(
                                        "'{}' at line {} targets a loop outside the selection",
                                        m.as_str(),
                                        line
                                    ),
                                )
                            });
                        }
                    }
                    "await" => {
                        found.entry("await").or_insert_with(|| {
                            Diagnostic::warning(
                                codes::ASYNC_BOUNDARY,
                                format!(
                                    "'await' at line {}; the extracted method must be async",
                                    line
                                ),
                            )
                        });
                    }
                    _ => {}
                }
            }
        }
        found.into_values().collect()
    }
}

/// Return type for a return set: void, the single type, or a tuple.
pub fn return_type(returns: &[VariableInfo], spec: &LanguageSpec) -> String {
    let type_of = |v: &VariableInfo| {
        v.inferred_type
            .clone()
            .unwrap_or_else(|| spec.types.object.to_string())
    };
    match returns {
        [] => spec.types.void.to_string(),
        [single] => type_of(single),
        many => {
            let joined = many.iter().map(type_of).collect::<Vec<_>>().join(", ");
            match spec.tuple {
                TupleStyle::Parenthesized => format!("({})", joined),
                TupleStyle::Bracketed => format!("[{}]", joined),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SourceLanguage;

    struct Fixture {
        adapter: LanguageScopeAdapter,
        scan: ScopeScan,
        statics: HashSet<String>,
    }

    impl Fixture {
        fn new(language: SourceLanguage, text: &str) -> Self {
            let adapter = LanguageScopeAdapter::new(language).unwrap();
            let lines: Vec<String> = text.lines().map(String::from).collect();
            let scan = adapter.scan(&lines);
            Fixture {
                adapter,
                scan,
                statics: HashSet::new(),
            }
        }

        fn analyze(&self, start: usize, end: usize) -> ExtractMethodResult<FlowAnalysis> {
            self.analyze_with(start, end, false)
        }

        fn analyze_with(
            &self,
            start: usize,
            end: usize,
            strict: bool,
        ) -> ExtractMethodResult<FlowAnalysis> {
            analyze(&FlowInput {
                adapter: &self.adapter,
                scan: &self.scan,
                start_line: start,
                end_line: end,
                known_static_types: &self.statics,
                strict_mixed_returns: strict,
            })
        }
    }

    fn names(vars: &[VariableInfo]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    const ORDER: &str = "\
public class Order
{
    private int _count;
    private string label;

    public int Method(int y)
    {
        Console.WriteLine(y);
        var x = 1;
        _count += y;
        label = \"order\";
        x = x + y;
        return x;
    }
}
";

    mod csharp {
        use super::*;

        #[test]
        fn parameter_local_and_excluded_field() {
            let f = Fixture::new(SourceLanguage::CSharp, ORDER);
            let result = f.analyze(8, 11).unwrap();
            let m = &result.mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["y"]);
            assert_eq!(m.parameters_to_pass[0].inferred_type.as_deref(), Some("int"));
            assert_eq!(names(&m.variables_to_declare), vec!["x"]);
            assert_eq!(names(&m.variables_to_return), vec!["x"]);
            assert_eq!(m.return_kind, ReturnKind::Declare);
            assert_eq!(m.suggested_return_type, "int");
            assert!(m.variables_to_assign.is_empty());
        }

        #[test]
        fn external_mutation_assigned() {
            let text = "\
class A
{
    void Run(int[] prices)
    {
        int total = 0;
        foreach (var p in prices)
        {
            total += p;
        }
        Console.WriteLine(total);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(6, 9).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["prices", "total"]);
            assert_eq!(names(&m.variables_to_assign), vec!["total"]);
            assert_eq!(m.return_kind, ReturnKind::Assign);
            assert_eq!(m.suggested_return_type, "int");
            assert_eq!(m.variables_to_assign[0].role, VariableRole::ExternalMutation);
        }

        #[test]
        fn unconditional_first_write_is_not_a_parameter() {
            let text = "\
class A
{
    void Run(int a)
    {
        int result;
        result = a * 2;
        Console.WriteLine(result);
        Use(result);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(6, 7).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["a"]);
            assert_eq!(names(&m.locals_to_introduce), vec!["result"]);
            assert_eq!(names(&m.variables_to_assign), vec!["result"]);
            assert_eq!(m.variables_to_assign[0].inferred_type.as_deref(), Some("int"));
        }

        #[test]
        fn tuple_return_in_write_order() {
            let text = "\
class A
{
    void Run()
    {
        var name = \"n\";
        var count = 2;
        Print(name, count);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(5, 6).unwrap().mapping;
            assert_eq!(names(&m.variables_to_return), vec!["name", "count"]);
            assert_eq!(m.suggested_return_type, "(string, int)");
        }

        #[test]
        fn mixed_returns_degrade_or_fail() {
            let text = "\
class A
{
    void Run()
    {
        int total = 0;
        var extra = 5;
        total = total + extra;
        Print(total, extra);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let result = f.analyze(6, 7).unwrap();
            assert_eq!(result.mapping.return_kind, ReturnKind::Assign);
            assert_eq!(names(&result.mapping.variables_to_return), vec!["extra", "total"]);
            assert!(result.diagnostics.iter().any(|d| d.code == codes::MIXED_RETURNS));

            let err = f.analyze_with(6, 7, true).unwrap_err();
            assert!(matches!(err, ExtractMethodError::MixedReturns { .. }));
        }

        #[test]
        fn loop_wrap_counts_as_after() {
            let text = "\
class A
{
    void Run(int n)
    {
        int last = 0;
        for (int i = 0; i < n; i++)
        {
            Print(last);
            last = i;
        }
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(9, 9).unwrap().mapping;
            assert_eq!(names(&m.variables_to_assign), vec!["last"]);
            assert_eq!(names(&m.parameters_to_pass), vec!["i"]);
        }

        #[test]
        fn lambdas_calls_and_statics_excluded() {
            let text = "\
class A
{
    void Run(List<int> items, int limit)
    {
        var big = items.Where(v => v > limit).ToList();
        Process(big);
        Math.Max(limit, 1);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(5, 7).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["items", "limit"]);
            assert_eq!(m.parameters_to_pass[0].inferred_type.as_deref(), Some("List<int>"));
            assert!(m.variables_to_return.is_empty());
        }

        #[test]
        fn nested_declarations_stay_inside() {
            let text = "\
class A
{
    void Run(bool flag)
    {
        if (flag)
        {
            var inner = 1;
            Print(inner);
        }
        var inner2 = 3;
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let m = f.analyze(5, 9).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["flag"]);
            assert!(m.variables_to_declare.is_empty());
            assert!(m.returns_nothing());
        }

        #[test]
        fn control_flow_warnings() {
            let text = "\
class A
{
    async Task Run(int n)
    {
        while (n > 0)
        {
            if (n == 3) break;
            await Task.Delay(n);
            n--;
        }
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let inside = f.analyze(5, 10).unwrap();
            assert!(!inside.diagnostics.iter().any(|d| d.code == codes::CONTROL_FLOW));
            assert!(inside.diagnostics.iter().any(|d| d.code == codes::ASYNC_BOUNDARY));
            let partial = f.analyze(7, 9).unwrap();
            assert!(partial.diagnostics.iter().any(|d| d.code == codes::CONTROL_FLOW));
        }

        #[test]
        fn unbalanced_document_falls_back() {
            let text = "class A\n{\n    void Run(int a)\n    {\n        Print(a);\n";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let result = f.analyze(5, 5).unwrap();
            assert!(result.fallback);
            assert!(result.mapping.parameters_to_pass.is_empty());
            assert_eq!(result.mapping.suggested_return_type, "void");
            let codes_found: Vec<&str> =
                result.diagnostics.iter().map(|d| d.code.as_str()).collect();
            assert_eq!(codes_found, vec![codes::SCOPE_IMBALANCE, codes::ANALYSIS_FALLBACK]);
        }

        #[test]
        fn unresolved_types_reported() {
            let text = "\
class A
{
    void Run(Widget w)
    {
        var thing = w.Make();
        Use(thing);
    }
}
";
            let f = Fixture::new(SourceLanguage::CSharp, text);
            let result = f.analyze(5, 5).unwrap();
            let mapping = &result.mapping;
            assert_eq!(mapping.parameters_to_pass[0].inferred_type.as_deref(), Some("Widget"));
            assert_eq!(mapping.variables_to_return[0].inferred_type.as_deref(), Some("object"));
            assert!(result.diagnostics.iter().any(|d| d.code == codes::TYPE_UNRESOLVED));
        }
    }

    mod typescript {
        use super::*;

        const CART: &str = "\
import { format } from './fmt';

export class Cart {
    total(items: number[], rate: number): string {
        let sum = 0;
        for (const x of items) {
            sum += x;
        }
        const taxed = sum * rate;
        return format(taxed);
    }
}
";

        #[test]
        fn mutation_and_declaration_keywords() {
            let f = Fixture::new(SourceLanguage::TypeScript, CART);
            let m = f.analyze(6, 8).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["items", "sum"]);
            assert_eq!(m.parameters_to_pass[0].inferred_type.as_deref(), Some("number[]"));
            assert_eq!(names(&m.variables_to_assign), vec!["sum"]);
            assert_eq!(m.suggested_return_type, "number");

            let m = f.analyze(9, 9).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["sum", "rate"]);
            assert_eq!(names(&m.variables_to_return), vec!["taxed"]);
            assert_eq!(m.variables_to_return[0].declaration_keyword.as_deref(), Some("const"));
        }

        #[test]
        fn imports_and_object_keys_excluded() {
            let text = "\
import { format } from './fmt';

function show(value: number) {
    const view = { label: format(value), size: value };
    console.log(view);
}
";
            let f = Fixture::new(SourceLanguage::TypeScript, text);
            let m = f.analyze(4, 4).unwrap().mapping;
            assert_eq!(names(&m.parameters_to_pass), vec!["value"]);
            assert_eq!(names(&m.variables_to_return), vec!["view"]);
        }

        #[test]
        fn array_destructuring_declarations() {
            let text = "\
function split(pair: string) {
    const [head, tail] = pair.split(':');
    console.log(head, tail);
}
";
            let f = Fixture::new(SourceLanguage::TypeScript, text);
            let m = f.analyze(2, 2).unwrap().mapping;
            assert_eq!(names(&m.variables_to_return), vec!["head", "tail"]);
            assert_eq!(names(&m.parameters_to_pass), vec!["pair"]);
            assert!(m.suggested_return_type.starts_with('['));
            assert_eq!(m.return_kind, ReturnKind::Declare);
        }
    }

    mod helpers {
        use super::*;
        use crate::patterns::{CSHARP, TYPESCRIPT};

        #[test]
        fn member_parameters() {
            let params = parse_member_parameters(
                "public (int, string) Load(Dictionary<string, int> map, ref int count = 0)",
                "Load",
                &CSHARP,
            );
            assert_eq!(
                params,
                vec![
                    ("map".to_string(), Some("Dictionary<string, int>".to_string())),
                    ("count".to_string(), Some("int".to_string())),
                ]
            );
            let params = parse_member_parameters(
                "constructor(private readonly repo: Repo, opts?: Options = {})",
                "constructor",
                &TYPESCRIPT,
            );
            assert_eq!(
                params,
                vec![
                    ("repo".to_string(), Some("Repo".to_string())),
                    ("opts".to_string(), Some("Options".to_string())),
                ]
            );
        }

        #[test]
        fn destructuring_assignment_targets() {
            assert_eq!(destructuring_assignment("    (a, b) = Swap(b, a);"), Some((5, 9)));
            assert_eq!(destructuring_assignment("[x, y] = pair;"), Some((1, 5)));
            assert_eq!(destructuring_assignment("(a, b) == c"), None);
            assert_eq!(destructuring_assignment("Run(a);"), None);
        }

        #[test]
        fn initializers() {
            assert_eq!(initializer_after("var x = Foo(a, b);", 5).as_deref(), Some("Foo(a, b)"));
            assert_eq!(initializer_after("int a = 1, b = 2;", 5).as_deref(), Some("1"));
            assert_eq!(initializer_after("foreach (var x in xs)", 14), None);
        }

        #[test]
        fn previous_word_after_wide_separators() {
            assert_eq!(prev_word("return total", 7), Some("return"));
            assert_eq!(prev_word("var w =\u{00A0}new", 12), Some("new"));
            assert_eq!(prev_word("x\u{3000}new", 7), Some("new"));
            assert_eq!(prev_word("größe = 1", 7), Some("größe"));
            assert_eq!(prev_word("(", 1), None);
        }

        #[test]
        fn tuple_return_types() {
            let v = |n: &str, t: &str| {
                VariableInfo::new(n, Some(t.to_string()), VariableRole::LocalDeclaration)
            };
            assert_eq!(return_type(&[], &CSHARP), "void");
            assert_eq!(return_type(&[v("a", "int")], &CSHARP), "int");
            assert_eq!(return_type(&[v("a", "int"), v("b", "string")], &CSHARP), "(int, string)");
            assert_eq!(
                return_type(&[v("a", "number"), v("b", "string")], &TYPESCRIPT),
                "[number, string]"
            );
        }
    }
}
