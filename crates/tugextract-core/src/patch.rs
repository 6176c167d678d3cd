//! Patch types: content hashes, byte spans, and materialized edits.
//!
//! An extraction produces two edits against a single file (the selected lines
//! replaced by a call, and the new method inserted). These types carry those
//! edits to the JSON output and to the unified diff renderer.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::text::{line_start_offset, position_after_lines};

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }

    /// Short form used in log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Spans
// ============================================================================

/// Half-open byte range `[start, end)` within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Patch Materialization
// ============================================================================

/// A single edit as it appears in output (for JSON serialization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEdit {
    /// Workspace-relative file path.
    pub file: String,
    /// Byte range being replaced.
    pub span: Span,
    /// Original text (for verification).
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
    /// 1-indexed line number (for display).
    pub line: u32,
    /// 1-indexed column (for display).
    pub col: u32,
}

impl OutputEdit {
    /// Build an edit that replaces whole lines `first..first + count` of `content`.
    ///
    /// `first` is 1-indexed. A `count` of zero produces a zero-width insertion at
    /// the start of line `first`; inserting past the last line targets the end
    /// of the content. `new_lines` are joined with `line_ending` and each line is
    /// terminated, so the edit never merges with its neighbours.
    pub fn replace_lines(
        file: impl Into<String>,
        content: &str,
        first: u32,
        count: u32,
        new_lines: &[String],
        line_ending: &str,
    ) -> Self {
        let start = line_start_offset(content, first);
        let end = position_after_lines(content, first, count);
        let old_text = content[start..end].to_string();
        let joined = new_lines.join(line_ending);
        let unterminated_tail =
            end == content.len() && !content.is_empty() && !content.ends_with('\n');
        let new_text = if new_lines.is_empty() {
            String::new()
        } else if !unterminated_tail {
            format!("{}{}", joined, line_ending)
        } else if count == 0 {
            // Appending after an unterminated final line.
            format!("{}{}", line_ending, joined)
        } else {
            joined
        };
        OutputEdit {
            file: file.into(),
            span: Span::new(start as u64, end as u64),
            old_text,
            new_text,
            line: first,
            col: 1,
        }
    }

    /// Number of lines removed by this edit.
    pub fn old_line_count(&self) -> usize {
        self.old_text.lines().count()
    }

    /// Number of lines added by this edit.
    pub fn new_line_count(&self) -> usize {
        self.new_text.lines().count()
    }
}

/// Materialized patch output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializedPatch {
    /// Individual edits (ordered by file, then span.start).
    pub edits: Vec<OutputEdit>,
    /// Standard unified diff format.
    pub unified_diff: String,
}

impl MaterializedPatch {
    /// Build a patch from edits, sorting them and rendering the diff.
    pub fn from_edits(mut edits: Vec<OutputEdit>) -> Self {
        edits.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.span.start.cmp(&b.span.start))
        });
        let unified_diff = crate::diff::generate_unified_diff(&edits);
        MaterializedPatch {
            edits,
            unified_diff,
        }
    }

    /// Apply the edits for `file` to `content`, returning the new content.
    ///
    /// Edits must not overlap. Returns `None` when an edit's `old_text` does not
    /// match the content at its span.
    pub fn apply_to(&self, file: &str, content: &str) -> Option<String> {
        let mut result = content.to_string();
        let mut file_edits: Vec<&OutputEdit> =
            self.edits.iter().filter(|e| e.file == file).collect();
        file_edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
        for edit in file_edits {
            let start = edit.span.start as usize;
            let end = edit.span.end as usize;
            if result.get(start..end)? != edit.old_text {
                return None;
            }
            result.replace_range(start..end, &edit.new_text);
        }
        Some(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod content_hash {
        use super::*;

        #[test]
        fn compute_is_stable_hex() {
            let a = ContentHash::compute(b"class A {}");
            let b = ContentHash::compute(b"class A {}");
            assert_eq!(a, b);
            assert_eq!(a.0.len(), 64);
            assert!(a.0.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn different_content_differs() {
            assert_ne!(ContentHash::compute(b"a"), ContentHash::compute(b"b"));
        }

        #[test]
        fn short_is_prefix() {
            let hash = ContentHash::compute(b"x");
            assert!(hash.0.starts_with(hash.short()));
            assert_eq!(hash.short().len(), 12);
        }
    }

    mod span {
        use super::*;

        #[test]
        fn len_and_empty() {
            assert_eq!(Span::new(3, 7).len(), 4);
            assert!(Span::new(5, 5).is_empty());
        }

        #[test]
        fn adjacent_spans_do_not_overlap() {
            assert!(!Span::new(0, 4).overlaps(&Span::new(4, 8)));
            assert!(Span::new(0, 5).overlaps(&Span::new(4, 8)));
        }

        #[test]
        #[should_panic]
        fn inverted_span_panics() {
            let _ = Span::new(5, 1);
        }
    }

    mod line_edits {
        use super::*;

        const CONTENT: &str = "a\nb\nc\nd\n";

        #[test]
        fn replace_middle_lines() {
            let edit = OutputEdit::replace_lines("f.cs", CONTENT, 2, 2, &["X".to_string()], "\n");
            assert_eq!(edit.old_text, "b\nc\n");
            assert_eq!(edit.new_text, "X\n");
            assert_eq!(edit.line, 2);
        }

        #[test]
        fn zero_count_is_insertion() {
            let edit = OutputEdit::replace_lines("f.cs", CONTENT, 4, 0, &["Y".to_string()], "\n");
            assert!(edit.span.is_empty());
            assert_eq!(edit.old_text, "");
        }

        #[test]
        fn patch_applies_non_overlapping_edits() {
            let edits = vec![
                OutputEdit::replace_lines("f.cs", CONTENT, 1, 1, &["A".to_string()], "\n"),
                OutputEdit::replace_lines("f.cs", CONTENT, 4, 0, &["Z".to_string()], "\n"),
            ];
            let patch = MaterializedPatch::from_edits(edits);
            let applied = patch.apply_to("f.cs", CONTENT).expect("edits should apply");
            assert_eq!(applied, "A\nb\nc\nZ\nd\n");
        }

        #[test]
        fn stale_old_text_is_rejected() {
            let edits = vec![OutputEdit::replace_lines(
                "f.cs",
                CONTENT,
                1,
                1,
                &["A".to_string()],
                "\n",
            )];
            let patch = MaterializedPatch::from_edits(edits);
            assert!(patch.apply_to("f.cs", "q\nb\nc\nd\n").is_none());
        }
    }
}
