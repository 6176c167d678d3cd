//! Unified diff generation utilities.
//!
//! Provides functions to generate standard unified diff format from edit information.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::patch::OutputEdit;

/// Generate a unified diff from edit information.
///
/// Groups edits by file (in path order) and renders one hunk per edit with
/// no context lines. Multi-line edits produce multi-line hunks, and the
/// new-side line numbers account for the growth or shrinkage of earlier
/// hunks in the same file.
pub fn generate_unified_diff(edits: &[OutputEdit]) -> String {
    let mut by_file: BTreeMap<&str, Vec<&OutputEdit>> = BTreeMap::new();
    for edit in edits {
        by_file.entry(&edit.file).or_default().push(edit);
    }

    let mut diff = String::new();
    for (file, mut file_edits) in by_file {
        file_edits.sort_by_key(|e| e.span.start);
        let _ = writeln!(diff, "--- a/{}", file);
        let _ = writeln!(diff, "+++ b/{}", file);

        let mut shift: i64 = 0;
        for edit in file_edits {
            let old_count = edit.old_line_count();
            let new_count = edit.new_line_count();
            let old_start = if old_count == 0 {
                edit.line as i64 - 1
            } else {
                edit.line as i64
            };
            let new_start = if new_count == 0 {
                edit.line as i64 - 1 + shift
            } else {
                edit.line as i64 + shift
            };
            let _ = writeln!(
                diff,
                "@@ -{},{} +{},{} @@",
                old_start.max(0),
                old_count,
                new_start.max(0),
                new_count
            );
            for line in edit.old_text.lines() {
                let _ = writeln!(diff, "-{}", line.strip_suffix('\r').unwrap_or(line));
            }
            for line in edit.new_text.lines() {
                let _ = writeln!(diff, "+{}", line.strip_suffix('\r').unwrap_or(line));
            }
            shift += new_count as i64 - old_count as i64;
        }
    }

    diff
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Span;

    fn edit(file: &str, start: u64, end: u64, old: &str, new: &str, line: u32) -> OutputEdit {
        OutputEdit {
            file: file.to_string(),
            span: Span::new(start, end),
            old_text: old.to_string(),
            new_text: new.to_string(),
            line,
            col: 1,
        }
    }

    #[test]
    fn single_replacement_hunk() {
        let edits = vec![edit("A.cs", 10, 30, "x = 1;\ny = 2;\n", "Foo();\n", 3)];
        let diff = generate_unified_diff(&edits);
        assert!(diff.contains("--- a/A.cs"));
        assert!(diff.contains("+++ b/A.cs"));
        assert!(diff.contains("@@ -3,2 +3,1 @@"));
        assert!(diff.contains("-x = 1;"));
        assert!(diff.contains("-y = 2;"));
        assert!(diff.contains("+Foo();"));
    }

    #[test]
    fn later_hunks_are_shifted() {
        let edits = vec![
            edit("A.cs", 10, 30, "a\nb\nc\n", "call\n", 3),
            edit("A.cs", 80, 80, "", "\nvoid M()\n{\n}\n", 10),
        ];
        let diff = generate_unified_diff(&edits);
        assert!(diff.contains("@@ -3,3 +3,1 @@"));
        assert!(diff.contains("@@ -9,0 +8,4 @@"));
        assert_eq!(diff.matches("--- a/A.cs").count(), 1);
    }

    #[test]
    fn multiple_files_in_path_order() {
        let edits = vec![
            edit("b.ts", 0, 2, "x\n", "y\n", 1),
            edit("a.ts", 0, 2, "p\n", "q\n", 1),
        ];
        let diff = generate_unified_diff(&edits);
        let a = diff.find("--- a/a.ts").expect("a.ts header");
        let b = diff.find("--- a/b.ts").expect("b.ts header");
        assert!(a < b);
    }

    #[test]
    fn empty_edits_produce_empty_diff() {
        assert!(generate_unified_diff(&[]).is_empty());
    }
}
