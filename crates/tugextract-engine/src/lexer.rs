// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Line sanitizer.
//!
//! Scope scanning counts braces and the flow analyzer tokenizes identifiers.
//! Both go wrong if they look inside comments or string literals, so every
//! line is first passed through [`LineSanitizer`], which replaces comment
//! text and literal contents with spaces. Delimiters are kept (`"    "`), so
//! a later pass can still tell that a string literal was there.
//!
//! The sanitizer carries state across lines: block comments, C# verbatim
//! strings, TypeScript template literals and interpolation holes may all
//! span line breaks. Code inside an interpolation hole is kept, since names
//! used there are real reads.
//!
//! The output of [`LineSanitizer::sanitize`] has exactly as many characters
//! as its input.
//!
//! Known limitation: TypeScript regex literals are not recognized. A quote
//! inside `/.../` is treated as the start of a string that ends at the end
//! of the line.

use crate::patterns::LanguageSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    /// `"..."` or `'...'` with backslash escapes; ends at end of line.
    Quote(char),
    /// C# `@"..."` with `""` escapes; may span lines.
    Verbatim,
    /// TypeScript backtick template; may span lines.
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    BlockComment,
    Literal {
        kind: LiteralKind,
        interpolated: bool,
    },
    /// Code inside `{...}` of an interpolated literal. `braces` counts nested
    /// braces opened inside the hole.
    Hole {
        braces: u32,
    },
}

/// Stateful, line-at-a-time comment and literal blanker.
#[derive(Debug)]
pub struct LineSanitizer {
    spec: &'static LanguageSpec,
    stack: Vec<Mode>,
}

impl LineSanitizer {
    pub fn new(spec: &'static LanguageSpec) -> Self {
        LineSanitizer {
            spec,
            stack: Vec::new(),
        }
    }

    /// Sanitize one line, updating the carried state.
    pub fn sanitize(&mut self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len());

        if self.stack.is_empty()
            && self.spec.hash_directives
            && line.trim_start().starts_with('#')
        {
            out.extend(chars.iter().map(|_| ' '));
            return out;
        }

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match self.stack.last().copied() {
                Some(Mode::BlockComment) => {
                    if c == '*' && next == Some('/') {
                        out.push_str("  ");
                        self.stack.pop();
                        i += 2;
                    } else {
                        out.push(' ');
                        i += 1;
                    }
                }
                Some(Mode::Literal { kind, interpolated }) => {
                    i += self.literal_char(&chars, i, kind, interpolated, &mut out);
                }
                Some(Mode::Hole { .. }) | None => {
                    let consumed = self.code_char(&chars, i, &mut out);
                    if consumed == 0 {
                        // Line comment: blank the rest.
                        out.extend(chars[i..].iter().map(|_| ' '));
                        break;
                    }
                    i += consumed;
                }
            }
        }

        // Plain quoted literals never continue onto the next line.
        if let Some(pos) = self
            .stack
            .iter()
            .position(|m| matches!(m, Mode::Literal { kind: LiteralKind::Quote(_), .. }))
        {
            self.stack.truncate(pos);
        }
        out
    }

    /// Handle one position inside a literal. Returns characters consumed.
    fn literal_char(
        &mut self,
        chars: &[char],
        i: usize,
        kind: LiteralKind,
        interpolated: bool,
        out: &mut String,
    ) -> usize {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match kind {
            LiteralKind::Quote(q) => {
                if c == '\\' {
                    let n = if next.is_some() { 2 } else { 1 };
                    out.push_str(&" ".repeat(n));
                    return n;
                }
                if c == q {
                    out.push(q);
                    self.stack.pop();
                    return 1;
                }
            }
            LiteralKind::Verbatim => {
                if c == '"' {
                    if next == Some('"') {
                        out.push_str("  ");
                        return 2;
                    }
                    out.push('"');
                    self.stack.pop();
                    return 1;
                }
            }
            LiteralKind::Template => {
                if c == '\\' {
                    let n = if next.is_some() { 2 } else { 1 };
                    out.push_str(&" ".repeat(n));
                    return n;
                }
                if c == '`' {
                    out.push('`');
                    self.stack.pop();
                    return 1;
                }
                if c == '$' && next == Some('{') {
                    out.push_str("  ");
                    self.stack.push(Mode::Hole { braces: 0 });
                    return 2;
                }
                out.push(' ');
                return 1;
            }
        }
        if interpolated && c == '{' {
            if next == Some('{') {
                out.push_str("  ");
                return 2;
            }
            out.push(' ');
            self.stack.push(Mode::Hole { braces: 0 });
            return 1;
        }
        out.push(' ');
        1
    }

    /// Handle one position of code. Returns characters consumed, or 0 when a
    /// line comment starts here.
    fn code_char(&mut self, chars: &[char], i: usize, out: &mut String) -> usize {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if let Some(Mode::Hole { braces }) = self.stack.last_mut() {
            match c {
                '{' => {
                    *braces += 1;
                    out.push(' ');
                    return 1;
                }
                '}' => {
                    if *braces == 0 {
                        self.stack.pop();
                    } else {
                        *braces -= 1;
                    }
                    out.push(' ');
                    return 1;
                }
                _ => {}
            }
        }

        match c {
            '/' if next == Some('/') => 0,
            '/' if next == Some('*') => {
                out.push_str("  ");
                self.stack.push(Mode::BlockComment);
                2
            }
            '"' | '\'' => {
                out.push(c);
                self.stack.push(Mode::Literal {
                    kind: LiteralKind::Quote(c),
                    interpolated: false,
                });
                1
            }
            '`' if self.spec.template_literals => {
                out.push('`');
                self.stack.push(Mode::Literal {
                    kind: LiteralKind::Template,
                    interpolated: true,
                });
                1
            }
            '$' | '@' if self.spec.prefixed_strings => {
                // `$"`, `@"`, `$@"`, `@$"`
                let mut j = i;
                let mut verbatim = false;
                let mut interpolated = false;
                while j < chars.len() && j < i + 2 && matches!(chars[j], '$' | '@') {
                    verbatim |= chars[j] == '@';
                    interpolated |= chars[j] == '$';
                    j += 1;
                }
                if chars.get(j) != Some(&'"') {
                    out.push(c);
                    return 1;
                }
                out.extend(chars[i..=j].iter());
                let kind = if verbatim {
                    LiteralKind::Verbatim
                } else {
                    LiteralKind::Quote('"')
                };
                self.stack.push(Mode::Literal { kind, interpolated });
                j + 1 - i
            }
            _ => {
                out.push(c);
                1
            }
        }
    }
}

/// Sanitize a whole document, one output line per input line.
pub fn sanitize_lines(spec: &'static LanguageSpec, lines: &[String]) -> Vec<String> {
    let mut sanitizer = LineSanitizer::new(spec);
    lines.iter().map(|line| sanitizer.sanitize(line)).collect()
}
