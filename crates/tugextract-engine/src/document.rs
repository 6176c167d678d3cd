// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Immutable source document.

use tugextract_core::text::{split_lines, LineEnding};

use crate::language::SourceLanguage;

/// Full text of one file plus its line array.
///
/// Lines are addressed 1-based through [`SourceDocument::line`]; the `lines`
/// vector itself is 0-based. Line terminators are stripped and recorded in
/// `line_ending` so the splice can reproduce them.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub text: String,
    pub lines: Vec<String>,
    pub language: SourceLanguage,
    pub line_ending: LineEnding,
    pub trailing_newline: bool,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>, language: SourceLanguage) -> Self {
        let text = text.into();
        let lines = split_lines(&text);
        let line_ending = LineEnding::detect(&text);
        let trailing_newline = text.ends_with('\n');
        SourceDocument {
            text,
            lines,
            language,
            line_ending,
            trailing_newline,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True when the document has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Line by 1-based number.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Join lines back into text with this document's conventions.
    pub fn render(&self, lines: &[String]) -> String {
        let mut text = lines.join(self.line_ending.as_str());
        if self.trailing_newline && !lines.is_empty() {
            text.push_str(self.line_ending.as_str());
        }
        text
    }
}
