// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Insertion-point resolution and the textual splice.
//!
//! The splice works on the line array after the selection has been replaced
//! by the call site. Strategies, tried in order:
//!
//! 1. Just before the closing brace of the type enclosing the selection.
//! 2. Right after the enclosing free function (no type around it).
//! 3. Before the closing brace of the first type declared in the file.
//! 4. Before the second-to-last top-level closing brace.
//! 5. Before the last two lines.
//!
//! Anything past the first two is a fallback and gets reported.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{ExtractMethodError, ExtractMethodResult};
use crate::scope::{LanguageScopeAdapter, ScopeKind};
use crate::types::LineEdit;

/// How the insertion point was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionStrategy {
    EnclosingType,
    AfterFunction,
    FirstTypeKeyword,
    SecondToLastClosingBrace,
    BeforeLastTwoLines,
}

impl InsertionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertionStrategy::EnclosingType => "enclosing_type",
            InsertionStrategy::AfterFunction => "after_function",
            InsertionStrategy::FirstTypeKeyword => "first_type_keyword",
            InsertionStrategy::SecondToLastClosingBrace => "second_to_last_closing_brace",
            InsertionStrategy::BeforeLastTwoLines => "before_last_two_lines",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(
            self,
            InsertionStrategy::EnclosingType | InsertionStrategy::AfterFunction
        )
    }
}

impl fmt::Display for InsertionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the method goes in the modified line array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// 0-based index; the method is inserted before this line.
    pub index: usize,
    pub strategy: InsertionStrategy,
}

/// Anchors for the preferred strategies, in modified-line coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionAnchors {
    /// 1-based header line of the type enclosing the selection.
    pub type_line: Option<usize>,
    /// 1-based last line of the enclosing free function.
    pub function_end: Option<usize>,
}

/// Replace `start..=end` (1-based) with `replacement`.
pub fn replace_range(
    lines: &[String],
    start: usize,
    end: usize,
    replacement: &[String],
) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + replacement.len());
    out.extend_from_slice(&lines[..start - 1]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&lines[end..]);
    out
}

/// Line index and byte column of the `}` closing the first `{` at or after
/// `from` (1-based).
fn closing_brace_after(sanitized: &[String], from: usize) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut type_depth: Option<usize> = None;
    for (idx, text) in sanitized.iter().enumerate().skip(from.saturating_sub(1)) {
        for (col, ch) in text.char_indices() {
            match ch {
                '{' => {
                    if type_depth.is_none() {
                        type_depth = Some(depth);
                    }
                    depth += 1;
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    if type_depth.is_some_and(|d| depth <= d) {
                        return Some((idx, col));
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// The closer must start its line; inserting before a line such as `  }}`
/// would land inside the member closed by the first brace.
fn closer_line(sanitized: &[String], (idx, col): (usize, usize)) -> ExtractMethodResult<usize> {
    let before = sanitized[idx].get(..col).unwrap_or_default();
    if before.trim().is_empty() {
        Ok(idx)
    } else {
        Err(ExtractMethodError::NoInsertionPoint {
            reason: format!("closing brace on line {} shares its line with other code", idx + 1),
        })
    }
}

/// Pick the insertion point for `lines` (the call site already in place).
pub fn resolve_insertion(
    adapter: &LanguageScopeAdapter,
    lines: &[String],
    anchors: InsertionAnchors,
) -> ExtractMethodResult<InsertionPoint> {
    let sanitized = adapter.sanitize_lines(lines);
    let found = |index: usize, strategy: InsertionStrategy| {
        debug!(index, strategy = %strategy, "resolved insertion point");
        Ok(InsertionPoint { index, strategy })
    };

    if let Some(type_line) = anchors.type_line {
        if let Some(closer) = closing_brace_after(&sanitized, type_line) {
            return found(closer_line(&sanitized, closer)?, InsertionStrategy::EnclosingType);
        }
    }
    if anchors.type_line.is_none() {
        if let Some(end) = anchors.function_end.filter(|&e| e <= lines.len()) {
            return found(end, InsertionStrategy::AfterFunction);
        }
    }
    if let Some(line) = sanitized
        .iter()
        .position(|l| adapter.is_type_keyword_line(l))
        .map(|i| i + 1)
    {
        if let Some(closer) = closing_brace_after(&sanitized, line) {
            return found(closer_line(&sanitized, closer)?, InsertionStrategy::FirstTypeKeyword);
        }
    }

    let mut depth = 0usize;
    let mut top_level_closers = Vec::new();
    for (idx, text) in sanitized.iter().enumerate() {
        for ch in text.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if text.trim_start().starts_with('}') && depth <= 1 {
            top_level_closers.push(idx);
        }
    }
    if top_level_closers.len() >= 2 {
        return found(
            top_level_closers[top_level_closers.len() - 2],
            InsertionStrategy::SecondToLastClosingBrace,
        );
    }
    if lines.len() >= 2 {
        return found(lines.len() - 2, InsertionStrategy::BeforeLastTwoLines);
    }
    Err(ExtractMethodError::NoInsertionPoint {
        reason: format!("document has only {} line(s)", lines.len()),
    })
}

/// Insert a blank separator line and `method` before `index`.
pub fn splice(lines: &[String], index: usize, method: &[String]) -> Vec<String> {
    let index = index.min(lines.len());
    let mut out = Vec::with_capacity(lines.len() + method.len() + 1);
    out.extend_from_slice(&lines[..index]);
    out.push(String::new());
    out.extend_from_slice(method);
    out.extend_from_slice(&lines[index..]);
    out
}

/// Re-scan the final text and check that the header at `header_line`
/// (1-based) is a member of `type_name`, or a top-level function when
/// `type_name` is `None`.
pub fn verify_insertion(
    adapter: &LanguageScopeAdapter,
    final_lines: &[String],
    header_line: usize,
    method_name: &str,
    type_name: Option<&str>,
) -> bool {
    let scan = adapter.scan(final_lines);
    let Some(frame) = scan
        .frames
        .iter()
        .find(|f| f.start_line == header_line && f.kind.is_member())
    else {
        return false;
    };
    if frame.name != method_name {
        return false;
    }
    let enclosing_type = scan
        .enclosing_frames(header_line)
        .into_iter()
        .rev()
        .find(|f| f.kind == ScopeKind::Type && f.start_line < header_line);
    match (type_name, enclosing_type) {
        (Some(expected), Some(found)) => found.name == expected,
        (None, None) => true,
        _ => false,
    }
}

/// Whole-line edits in original-document coordinates.
///
/// `insertion_index` is in modified coordinates, where `call_lines` replaced
/// `start..=end`.
pub fn line_edits(
    start: usize,
    end: usize,
    call_lines: &[String],
    insertion_index: usize,
    method: &[String],
) -> Vec<LineEdit> {
    let removed = end - start + 1;
    let call_end = start - 1 + call_lines.len();
    let original_index = if insertion_index >= call_end {
        insertion_index + removed - call_lines.len()
    } else {
        insertion_index
    };
    let mut inserted = Vec::with_capacity(method.len() + 1);
    inserted.push(String::new());
    inserted.extend_from_slice(method);
    let mut edits = vec![
        LineEdit {
            start_line: start,
            removed,
            inserted: call_lines.to_vec(),
        },
        LineEdit {
            start_line: original_index + 1,
            removed: 0,
            inserted,
        },
    ];
    edits.sort_by_key(|e| e.start_line);
    edits
}
