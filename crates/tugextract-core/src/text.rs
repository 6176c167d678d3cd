//! Line-oriented text utilities.
//!
//! Extraction works on whole lines, so these helpers convert between
//! 1-indexed line numbers and byte offsets, and detect the line-ending
//! convention a document uses so edits can reproduce it.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Line values of 0 are treated as 1

use serde::{Deserialize, Serialize};

// ============================================================================
// Line Endings
// ============================================================================

/// Line-ending convention of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Detect the convention from the first line break in `content`.
    ///
    /// Content without any line break is treated as `Lf`.
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(idx) if idx > 0 && content.as_bytes()[idx - 1] == b'\r' => LineEnding::Crlf,
            _ => LineEnding::Lf,
        }
    }

    /// The literal separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Split content into lines without their terminators.
///
/// A trailing line break does not produce an empty final line, and a `\r`
/// preceding `\n` is stripped.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

// ============================================================================
// Offset Conversions
// ============================================================================

/// Convert a byte offset to 1-indexed line and column.
///
/// Columns count bytes. If `offset` exceeds content length, returns the
/// position at the end of content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;
    for (i, byte) in content.bytes().enumerate() {
        if i >= offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Byte offset where the given 1-indexed line starts.
///
/// Lines past the end of content map to `content.len()`.
pub fn line_start_offset(content: &str, line: u32) -> usize {
    let line = line.max(1);
    if line == 1 {
        return 0;
    }
    let mut current = 1u32;
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            current += 1;
            if current == line {
                return i + 1;
            }
        }
    }
    content.len()
}

/// Byte offset just past `count` whole lines starting at line `first`,
/// including their terminators.
pub fn position_after_lines(content: &str, first: u32, count: u32) -> usize {
    let first = first.max(1);
    line_start_offset(content, first.saturating_add(count))
}

/// Count lines in content. A trailing line break does not start a new line.
pub fn line_count(content: &str) -> u32 {
    if content.is_empty() {
        return 0;
    }
    let breaks = content.bytes().filter(|&b| b == b'\n').count() as u32;
    if content.ends_with('\n') {
        breaks
    } else {
        breaks + 1
    }
}

/// Leading whitespace of a line.
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

// ============================================================================
// Tests
// ============================================================================
