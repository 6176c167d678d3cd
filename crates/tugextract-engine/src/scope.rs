// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Language scope adapter.
//!
//! Recognizes namespaces, types, members and statement blocks by matching
//! sanitized lines against the language's header patterns and tracking brace
//! depth. This is deliberately lexical: no parse tree is built, and anything
//! the patterns do not recognize simply contributes depth.
//!
//! ## Frames
//!
//! A header match creates a *pending* frame. The frame is pushed when its
//! opening brace is seen, either on the header line or, for Allman style, at
//! the start of a following line. A line ending in `;` before any brace
//! cancels the pending frame (interface members, braceless `if`, file-scoped
//! namespaces). A `}` closes every open frame whose opening depth is reached.
//!
//! Which patterns apply depends on the innermost open frame:
//!
//! | Innermost frame            | Patterns tried                                  |
//! |----------------------------|-------------------------------------------------|
//! | none, Module               | module, type, function, arrow function, block   |
//! | Type                       | type, constructor, arrow method, method, accessor |
//! | Method, Constructor, Function, Block | function, arrow function, block       |

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::language::SourceLanguage;
use crate::lexer::sanitize_lines;
use crate::patterns::LanguageSpec;

// ============================================================================
// Frames
// ============================================================================

/// Kind of lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    Type,
    Method,
    Constructor,
    Function,
    Block,
}

impl ScopeKind {
    /// Methods, constructors and functions.
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            ScopeKind::Method | ScopeKind::Constructor | ScopeKind::Function
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Type => "type",
            ScopeKind::Method => "method",
            ScopeKind::Constructor => "constructor",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
        }
    }
}

/// One recognized scope.
///
/// Lines are 1-based. `end_line` is 0 while the frame is still open (and
/// stays 0 if the document ends first). Block frames use the opening keyword
/// (`if`, `foreach`, `else if`) as their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Line holding the opening brace.
    pub body_line: usize,
    /// Brace depth just before the opening brace.
    pub open_depth: usize,
    /// Header carries the `static` modifier.
    pub is_static: bool,
}

impl ScopeFrame {
    /// Frame is open at `line`, excluding frames that open and close on the
    /// same line.
    pub fn encloses(&self, line: usize) -> bool {
        if self.is_closed() && self.body_line == self.end_line {
            return false;
        }
        self.start_line <= line && (!self.is_closed() || self.end_line > line)
    }

    pub fn is_closed(&self) -> bool {
        self.end_line != 0
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Result of scanning a whole document once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeScan {
    /// Sanitized lines, same count as the input.
    pub lines: Vec<String>,
    /// Brace depth at the start of each line (0-based index).
    pub depth_at_start: Vec<usize>,
    /// Brace depth after the last line.
    pub final_depth: usize,
    /// Every recognized frame, in opening order.
    pub frames: Vec<ScopeFrame>,
    /// False when a `}` had nothing to close or braces remain open at the end.
    pub balanced: bool,
}

impl ScopeScan {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sanitized text of a 1-based line.
    pub fn line(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Depth at the start of a 1-based line.
    pub fn depth_before(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|idx| self.depth_at_start.get(idx).copied())
            .unwrap_or(self.final_depth)
    }

    /// Depth after a 1-based line.
    pub fn depth_after(&self, line: usize) -> usize {
        self.depth_at_start
            .get(line)
            .copied()
            .unwrap_or(self.final_depth)
    }

    /// Depth at a byte column of a 1-based line.
    pub fn depth_at(&self, line: usize, col: usize) -> usize {
        let text = self.line(line);
        let prefix = text.get(..col.min(text.len())).unwrap_or(text);
        apply_braces(self.depth_before(line), prefix).0
    }

    /// Frames open at `line`, outermost first.
    pub fn enclosing_frames(&self, line: usize) -> Vec<&ScopeFrame> {
        self.frames.iter().filter(|f| f.encloses(line)).collect()
    }

    /// Innermost frame open at `line` matching `pred`.
    pub fn innermost<F>(&self, line: usize, pred: F) -> Option<&ScopeFrame>
    where
        F: Fn(&ScopeFrame) -> bool,
    {
        self.enclosing_frames(line).into_iter().rev().find(|f| pred(f))
    }

    /// Innermost type enclosing `line`.
    pub fn enclosing_type(&self, line: usize) -> Option<&ScopeFrame> {
        self.innermost(line, |f| f.kind == ScopeKind::Type)
    }

    /// Innermost method, constructor or function enclosing `line`.
    pub fn enclosing_member(&self, line: usize) -> Option<&ScopeFrame> {
        self.innermost(line, |f| f.kind.is_member())
    }

    /// Outermost method, constructor or function enclosing `line`.
    pub fn outermost_member(&self, line: usize) -> Option<&ScopeFrame> {
        self.enclosing_frames(line)
            .into_iter()
            .find(|f| f.kind.is_member())
    }

    /// Frames whose header starts inside `start..=end`.
    pub fn frames_starting_in(&self, start: usize, end: usize) -> Vec<&ScopeFrame> {
        self.frames
            .iter()
            .filter(|f| f.start_line >= start && f.start_line <= end)
            .collect()
    }

    /// Last line of the frame's body, or the last line of the document for
    /// frames that never closed.
    pub fn frame_last_line(&self, frame: &ScopeFrame) -> usize {
        if frame.is_closed() {
            frame.end_line
        } else {
            self.line_count()
        }
    }

    /// Sanitized header text, from the header line through the brace line.
    pub fn header_text(&self, frame: &ScopeFrame) -> String {
        (frame.start_line..=frame.body_line.max(frame.start_line))
            .map(|line| self.line(line).trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check that `start..=end` never closes a brace it did not open and
    /// leaves none open. Returns the first offending line on failure.
    pub fn check_range_balance(&self, start: usize, end: usize) -> Result<(), usize> {
        let mut depth: i64 = 0;
        for line in start..=end {
            for ch in self.line(line).chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth < 0 {
                            return Err(line);
                        }
                    }
                    _ => {}
                }
            }
        }
        if depth != 0 {
            return Err(end);
        }
        Ok(())
    }
}

/// Apply the braces in `text` to `depth`. Returns the new depth and whether
/// it tried to go below zero.
fn apply_braces(depth: usize, text: &str) -> (usize, bool) {
    let mut depth = depth;
    let mut underflow = false;
    for ch in text.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    underflow = true;
                } else {
                    depth -= 1;
                }
            }
            _ => {}
        }
    }
    (depth, underflow)
}

// ============================================================================
// Adapter
// ============================================================================

/// Compiled flow-analysis patterns, built alongside the scope patterns.
#[derive(Debug)]
pub struct FlowPatterns {
    pub identifier: Regex,
    pub declaration: Regex,
    pub destructuring: Vec<Regex>,
    pub catch_binding: Regex,
    pub pattern_binding: Option<Regex>,
    pub out_binding: Option<Regex>,
    pub field: Option<Regex>,
    pub module_symbol: Option<Regex>,
    pub lambda_single: Regex,
    pub lambda_list: Regex,
}

#[derive(Debug)]
struct HeaderPatterns {
    module: Regex,
    type_decl: Regex,
    method: Regex,
    constructor: Option<Regex>,
    accessor: Option<Regex>,
    arrow_method: Option<Regex>,
    function: Option<Regex>,
    arrow_function: Option<Regex>,
    block_opener: Regex,
    type_keyword_line: Regex,
}

/// A recognized header on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub kind: ScopeKind,
    pub name: String,
    pub is_static: bool,
}

fn compile_opt(src: Option<&str>) -> Result<Option<Regex>, regex::Error> {
    src.map(Regex::new).transpose()
}

/// Scope recognizer for one language.
///
/// Construction compiles every pattern in the language table; keep adapters
/// in an [`AdapterCache`] rather than rebuilding them per request.
#[derive(Debug)]
pub struct LanguageScopeAdapter {
    language: SourceLanguage,
    headers: HeaderPatterns,
    flow: FlowPatterns,
}

struct Pending {
    header: HeaderMatch,
    start_line: usize,
}

impl LanguageScopeAdapter {
    pub fn new(language: SourceLanguage) -> Result<Self, regex::Error> {
        let spec = language.spec();
        let headers = HeaderPatterns {
            module: Regex::new(spec.module)?,
            type_decl: Regex::new(spec.type_decl)?,
            method: Regex::new(spec.method)?,
            constructor: compile_opt(spec.constructor)?,
            accessor: compile_opt(spec.accessor)?,
            arrow_method: compile_opt(spec.arrow_method)?,
            function: compile_opt(spec.function)?,
            arrow_function: compile_opt(spec.arrow_function)?,
            block_opener: Regex::new(spec.block_opener)?,
            type_keyword_line: Regex::new(spec.type_keyword_line)?,
        };
        let flow = FlowPatterns {
            identifier: Regex::new(spec.identifier)?,
            declaration: Regex::new(spec.declaration)?,
            destructuring: spec
                .destructuring
                .iter()
                .map(|src| Regex::new(src))
                .collect::<Result<_, _>>()?,
            catch_binding: Regex::new(spec.catch_binding)?,
            pattern_binding: compile_opt(spec.pattern_binding)?,
            out_binding: compile_opt(spec.out_binding)?,
            field: compile_opt(spec.field)?,
            module_symbol: compile_opt(spec.module_symbol)?,
            lambda_single: Regex::new(spec.lambda_single)?,
            lambda_list: Regex::new(spec.lambda_list)?,
        };
        Ok(LanguageScopeAdapter {
            language,
            headers,
            flow,
        })
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    pub fn spec(&self) -> &'static LanguageSpec {
        self.language.spec()
    }

    pub fn flow_patterns(&self) -> &FlowPatterns {
        &self.flow
    }

    /// Blank comments and literal contents.
    pub fn sanitize_lines(&self, lines: &[String]) -> Vec<String> {
        sanitize_lines(self.spec(), lines)
    }

    /// Whether a sanitized line mentions a type declaration keyword.
    pub fn is_type_keyword_line(&self, text: &str) -> bool {
        self.headers.type_keyword_line.is_match(text)
    }

    /// Frames enclosing `target` (1-based), outermost first.
    ///
    /// Never fails; returns an empty stack when nothing is recognized.
    pub fn enclosing_frames(&self, lines: &[String], target: usize) -> Vec<ScopeFrame> {
        self.scan(lines)
            .enclosing_frames(target)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Scan a whole document.
    pub fn scan(&self, lines: &[String]) -> ScopeScan {
        let sanitized = self.sanitize_lines(lines);
        let mut depth_at_start = Vec::with_capacity(sanitized.len());
        let mut frames: Vec<ScopeFrame> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut pending: Option<Pending> = None;
        let mut depth = 0usize;
        let mut balanced = true;

        for (idx, text) in sanitized.iter().enumerate() {
            let line = idx + 1;
            depth_at_start.push(depth);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let header_text = trimmed.trim_start_matches('}').trim_start();
            let context = open.last().map(|&i| &frames[i]);
            let type_name = open
                .iter()
                .rev()
                .map(|&i| &frames[i])
                .find(|f| f.kind == ScopeKind::Type)
                .map(|f| f.name.as_str());
            if let Some(header) = self.match_header(header_text, context.map(|f| f.kind), type_name)
            {
                pending = Some(Pending {
                    header,
                    start_line: line,
                });
            }

            let mut first_brace = true;
            for ch in text.chars() {
                match ch {
                    '{' => {
                        if first_brace {
                            if let Some(p) = pending.take() {
                                let attaches = p.start_line == line
                                    || trimmed.starts_with('{')
                                    || (trimmed.ends_with('{') && !trimmed.contains(';'));
                                if attaches {
                                    open.push(frames.len());
                                    frames.push(ScopeFrame {
                                        kind: p.header.kind,
                                        name: p.header.name,
                                        start_line: p.start_line,
                                        end_line: 0,
                                        body_line: line,
                                        open_depth: depth,
                                        is_static: p.header.is_static,
                                    });
                                }
                            }
                            first_brace = false;
                        }
                        depth += 1;
                    }
                    '}' => {
                        if depth == 0 {
                            balanced = false;
                            continue;
                        }
                        depth -= 1;
                        while let Some(&top) = open.last() {
                            if frames[top].open_depth >= depth {
                                frames[top].end_line = line;
                                open.pop();
                            } else {
                                break;
                            }
                        }
                    }
                    _ => {}
                }
            }

            if pending.is_some() && trimmed.ends_with(';') {
                pending = None;
            }
        }

        if depth != 0 {
            balanced = false;
        }

        ScopeScan {
            lines: sanitized,
            depth_at_start,
            final_depth: depth,
            frames,
            balanced,
        }
    }

    /// Try the header patterns that apply under `context`.
    pub fn match_header(
        &self,
        text: &str,
        context: Option<ScopeKind>,
        type_name: Option<&str>,
    ) -> Option<HeaderMatch> {
        let h = &self.headers;
        let is_static = header_is_static(text);
        let found = |kind: ScopeKind, name: &str| {
            Some(HeaderMatch {
                kind,
                name: name.to_string(),
                is_static,
            })
        };
        let capture = |re: &Regex| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };

        match context {
            None | Some(ScopeKind::Module) => {
                if let Some(name) = capture(&h.module) {
                    return found(ScopeKind::Module, &name);
                }
                if let Some(name) = capture(&h.type_decl) {
                    return found(ScopeKind::Type, &name);
                }
                self.match_function_or_block(text, is_static)
            }
            Some(ScopeKind::Type) => {
                if let Some(name) = capture(&h.type_decl) {
                    return found(ScopeKind::Type, &name);
                }
                if let (Some(re), Some(type_name)) = (&h.constructor, type_name) {
                    if let Some(name) = capture(re) {
                        if name == type_name {
                            return found(ScopeKind::Constructor, &name);
                        }
                    }
                }
                if let Some(name) = h.arrow_method.as_ref().and_then(capture) {
                    return found(ScopeKind::Method, &name);
                }
                if let Some(name) = capture(&h.method) {
                    let spec = self.spec();
                    if spec.constructor_name == Some(name.as_str()) {
                        return found(ScopeKind::Constructor, &name);
                    }
                    if !spec.is_keyword(&name) {
                        return found(ScopeKind::Method, &name);
                    }
                }
                if let Some(name) = h.accessor.as_ref().and_then(capture) {
                    return found(ScopeKind::Method, &name);
                }
                None
            }
            Some(_) => self.match_function_or_block(text, is_static),
        }
    }

    fn match_function_or_block(&self, text: &str, is_static: bool) -> Option<HeaderMatch> {
        let h = &self.headers;
        for re in [&h.function, &h.arrow_function].into_iter().flatten() {
            if let Some(name) = re.captures(text).and_then(|c| c.get(1)) {
                return Some(HeaderMatch {
                    kind: ScopeKind::Function,
                    name: name.as_str().to_string(),
                    is_static,
                });
            }
        }
        h.block_opener
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| HeaderMatch {
                kind: ScopeKind::Block,
                name: m.as_str().split_whitespace().collect::<Vec<_>>().join(" "),
                is_static: false,
            })
    }
}

/// `static` appears among the words before the parameter list.
fn header_is_static(text: &str) -> bool {
    let head = text.split('(').next().unwrap_or(text);
    head.split_whitespace().any(|w| w == "static")
}

// ============================================================================
// Cache
// ============================================================================

/// Compiled adapters keyed by language, built on first use.
///
/// Owned by the engine; nothing is shared between engines.
#[derive(Debug, Default)]
pub struct AdapterCache {
    adapters: HashMap<SourceLanguage, Arc<LanguageScopeAdapter>>,
}

impl AdapterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        language: SourceLanguage,
    ) -> Result<Arc<LanguageScopeAdapter>, regex::Error> {
        if let Some(adapter) = self.adapters.get(&language) {
            return Ok(Arc::clone(adapter));
        }
        let adapter = Arc::new(LanguageScopeAdapter::new(language)?);
        self.adapters.insert(language, Arc::clone(&adapter));
        Ok(adapter)
    }

    pub fn clear(&mut self) {
        self.adapters.clear();
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn scan(language: SourceLanguage, text: &str) -> ScopeScan {
        LanguageScopeAdapter::new(language).unwrap().scan(&lines(text))
    }

    fn kinds(frames: &[&ScopeFrame]) -> Vec<(ScopeKind, String)> {
        frames.iter().map(|f| (f.kind, f.name.clone())).collect()
    }

    const CS_ALLMAN: &str = "\
namespace Shop
{
    public class Order
    {
        private int count;

        public Order(int id)
        {
            count = id;
        }

        public void Process(int y)
        {
            if (y > 0)
            {
                count += y;
            }
        }

        public abstract int Rate();
    }
}
";

    mod csharp {
        use super::*;

        #[test]
        fn allman_frames() {
            let s = scan(SourceLanguage::CSharp, CS_ALLMAN);
            assert!(s.balanced);
            let at_16 = s.enclosing_frames(16);
            assert_eq!(
                kinds(&at_16),
                vec![
                    (ScopeKind::Module, "Shop".to_string()),
                    (ScopeKind::Type, "Order".to_string()),
                    (ScopeKind::Method, "Process".to_string()),
                    (ScopeKind::Block, "if".to_string()),
                ]
            );
            let method = s.enclosing_member(16).unwrap();
            assert_eq!(method.start_line, 12);
            assert_eq!(method.body_line, 13);
            assert_eq!(method.end_line, 18);
        }

        #[test]
        fn constructor_by_type_name() {
            let s = scan(SourceLanguage::CSharp, CS_ALLMAN);
            let ctor = s.enclosing_member(9).unwrap();
            assert_eq!(ctor.kind, ScopeKind::Constructor);
            assert_eq!(ctor.name, "Order");
        }

        #[test]
        fn abstract_member_cancelled() {
            let s = scan(SourceLanguage::CSharp, CS_ALLMAN);
            assert!(s.frames.iter().all(|f| f.name != "Rate"));
            let ty = s.enclosing_type(20).unwrap();
            assert_eq!(ty.name, "Order");
            assert_eq!(ty.end_line, 21);
        }

        #[test]
        fn same_line_block_not_enclosing() {
            let s = scan(
                SourceLanguage::CSharp,
                "class A {\n    void M() {\n        if (x) { y(); }\n        z();\n    }\n}\n",
            );
            let at_3 = s.enclosing_frames(3);
            assert_eq!(at_3.last().unwrap().name, "M");
            assert!(s.frames.iter().any(|f| f.name == "if" && f.end_line == 3));
        }

        #[test]
        fn static_member_flag() {
            let s = scan(
                SourceLanguage::CSharp,
                "\
class A
{
    public static int Sum(int a)
    {
        return a;
    }
}
",
            );
            assert!(s.enclosing_member(5).unwrap().is_static);
        }

        #[test]
        fn braces_in_strings_ignored() {
            let s = scan(
                SourceLanguage::CSharp,
                "class A\n{\n    void M()\n    {\n        var s = \"}}}\";\n    }\n}\n",
            );
            assert!(s.balanced);
            assert_eq!(s.enclosing_member(5).unwrap().name, "M");
        }

        #[test]
        fn unbalanced_document() {
            let s = scan(SourceLanguage::CSharp, "class A\n{\n    void M()\n    {\n");
            assert!(!s.balanced);
            assert_eq!(s.enclosing_member(4).unwrap().end_line, 0);
            let s = scan(SourceLanguage::CSharp, "}\nclass A {}\n");
            assert!(!s.balanced);
        }

        #[test]
        fn multi_line_header() {
            let s = scan(
                SourceLanguage::CSharp,
                "class A {\n    void M(int a,\n           int b) {\n        a++;\n    }\n}\n",
            );
            let m = s.enclosing_member(4).unwrap();
            assert_eq!(m.start_line, 2);
            assert_eq!(m.body_line, 3);
        }
    }

    mod typescript {
        use super::*;

        const TS: &str = "\
export class Cart {
    constructor(private items: number[]) {
        this.items = items;
    }

    total(): number {
        let sum = 0;
        for (const x of this.items) {
            sum += x;
        }
        return sum;
    }

    handle = (e: Event) => {
        console.log(e);
    };
}

function helper(a: number): number {
    return a * 2;
}
";

        #[test]
        fn class_members() {
            let s = scan(SourceLanguage::TypeScript, TS);
            assert!(s.balanced);
            assert_eq!(s.enclosing_member(3).unwrap().kind, ScopeKind::Constructor);
            assert_eq!(
                kinds(&s.enclosing_frames(9)),
                vec![
                    (ScopeKind::Type, "Cart".to_string()),
                    (ScopeKind::Method, "total".to_string()),
                    (ScopeKind::Block, "for".to_string()),
                ]
            );
            assert_eq!(s.enclosing_member(15).unwrap().name, "handle");
        }

        #[test]
        fn free_function() {
            let s = scan(SourceLanguage::TypeScript, TS);
            let f = s.enclosing_member(20).unwrap();
            assert_eq!(f.kind, ScopeKind::Function);
            assert_eq!(f.name, "helper");
            assert!(s.enclosing_type(20).is_none());
        }
    }

    #[test]
    fn scanning_is_idempotent() {
        let adapter = LanguageScopeAdapter::new(SourceLanguage::CSharp).unwrap();
        let doc = lines(CS_ALLMAN);
        assert_eq!(adapter.scan(&doc), adapter.scan(&doc));
        assert_eq!(
            adapter.enclosing_frames(&doc, 16),
            adapter.enclosing_frames(&doc, 16)
        );
    }

    #[test]
    fn range_balance() {
        let s = scan(SourceLanguage::CSharp, CS_ALLMAN);
        assert!(s.check_range_balance(14, 17).is_ok());
        assert_eq!(s.check_range_balance(14, 16), Err(16));
        assert_eq!(s.check_range_balance(16, 18), Err(17));
    }

    #[test]
    fn depth_queries() {
        let s = scan(SourceLanguage::CSharp, CS_ALLMAN);
        assert_eq!(s.depth_before(16), 4);
        assert_eq!(s.depth_at(15, 12), 3);
        assert_eq!(s.depth_at(15, 13), 4);
        assert_eq!(s.depth_after(17), 3);
    }

    #[test]
    fn cache_builds_once() {
        let mut cache = AdapterCache::new();
        let a = cache.get_or_build(SourceLanguage::CSharp).unwrap();
        let b = cache.get_or_build(SourceLanguage::CSharp).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        cache.get_or_build(SourceLanguage::TypeScript).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
