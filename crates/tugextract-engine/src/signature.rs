// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Signature and body generation for the new method.
//!
//! The body is the selected lines re-based onto the new method's indentation.
//! Relative indentation inside the selection is kept, blank lines stay blank.

use tugextract_core::text::leading_whitespace;

use crate::error::{ExtractMethodError, ExtractMethodResult};
use crate::patterns::{AnnotationStyle, LanguageSpec, TupleStyle};
use crate::scope::ScopeFrame;
use crate::typeinfer::clean_type;
use crate::types::{VariableHandlingMapping, VariableInfo};

/// Indentation and brace layout of the new method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodLayout {
    /// Indentation of the member header the method is modeled on.
    pub member_indent: String,
    /// One level of indentation as used in the document.
    pub indent_unit: String,
    /// Opening brace on its own line.
    pub allman: bool,
}

impl MethodLayout {
    /// Layout copied from `member`, or language defaults when there is none.
    ///
    /// Inside a type the method sits one level below the type header, so a
    /// member nested deeper (a property accessor) does not shift it.
    pub fn from_member(
        lines: &[String],
        member: Option<&ScopeFrame>,
        enclosing_type: Option<&ScopeFrame>,
        spec: &LanguageSpec,
    ) -> Self {
        let indent_unit = detect_indent_unit(lines);
        match member {
            Some(m) => MethodLayout {
                member_indent: match enclosing_type {
                    Some(t) => format!("{}{}", line_indent(lines, t.start_line), indent_unit),
                    None => line_indent(lines, m.start_line).to_string(),
                },
                indent_unit,
                allman: m.body_line != m.start_line,
            },
            None => MethodLayout {
                member_indent: indent_unit.clone(),
                indent_unit,
                allman: spec.allman_default,
            },
        }
    }

    pub fn body_indent(&self) -> String {
        format!("{}{}", self.member_indent, self.indent_unit)
    }
}

fn line_indent(lines: &[String], line: usize) -> &str {
    line.checked_sub(1)
        .and_then(|i| lines.get(i))
        .map(|l| leading_whitespace(l))
        .unwrap_or("")
}

/// Indentation unit: a tab when lines are tab-indented, otherwise the
/// smallest space indent in the document (4 when nothing is indented).
pub fn detect_indent_unit(lines: &[String]) -> String {
    let mut smallest: Option<usize> = None;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let ws = leading_whitespace(line);
        if ws.starts_with('\t') {
            return "\t".to_string();
        }
        let n = ws.len();
        if n > 0 {
            smallest = Some(smallest.map_or(n, |s| s.min(n)));
        }
    }
    " ".repeat(smallest.unwrap_or(4))
}

/// Re-base `lines` onto `indent`, keeping indentation relative to the first
/// non-blank line.
pub fn reindent(lines: &[String], indent: &str) -> Vec<String> {
    let base = lines
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| leading_whitespace(l))
        .unwrap_or("");
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else if let Some(rest) = line.strip_prefix(base) {
                format!("{}{}", indent, rest)
            } else {
                format!("{}{}", indent, line.trim_start())
            }
        })
        .collect()
}

/// Type as it may appear in a signature. Placeholders become the object type.
pub fn signature_type(ty: Option<&str>, spec: &LanguageSpec) -> String {
    ty.and_then(clean_type)
        .unwrap_or_else(|| spec.types.object.to_string())
}

fn typed_binding(var: &VariableInfo, spec: &LanguageSpec) -> String {
    let ty = signature_type(var.inferred_type.as_deref(), spec);
    match spec.annotation {
        AnnotationStyle::Prefix => format!("{} {}", ty, var.name),
        AnnotationStyle::Suffix => format!("{}: {}", var.name, ty),
    }
}

/// Parameter list text, in mapping order.
pub fn parameter_list(mapping: &VariableHandlingMapping, spec: &LanguageSpec) -> String {
    mapping
        .parameters_to_pass
        .iter()
        .map(|v| typed_binding(v, spec))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Type parameters
// ============================================================================

/// A type parameter declared by an enclosing member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// As written inside the angle brackets: `T`, `in T`, `T extends Item`.
    pub declaration: String,
    /// C# `where` constraint for this parameter, without `where T :`.
    pub constraint: Option<String>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `word` occurs at byte `at` of `text` as a whole word.
fn is_word_at(text: &str, at: usize, word: &str) -> bool {
    let before = text[..at].chars().next_back();
    let after = text[at + word.len()..].chars().next();
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_ident_char(c)).filter(|w| !w.is_empty())
}

/// Byte index of the `>` closing the `<` at index 0. `=>` is not a closer.
fn closing_angle(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev = ' ';
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' if prev != '=' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        prev = ch;
    }
    None
}

/// `where T : c` clauses before the member body, as `(T, c)` pairs.
fn where_clauses(text: &str) -> Vec<(String, String)> {
    let body = [text.find('{'), text.find(';'), text.find("=>")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
    let text = &text[..body];
    let mut starts: Vec<usize> = text
        .match_indices("where")
        .map(|(i, _)| i)
        .filter(|&i| is_word_at(text, i, "where"))
        .collect();
    starts.push(text.len());
    starts
        .windows(2)
        .filter_map(|w| {
            let (param, constraint) = text[w[0] + "where".len()..w[1]].split_once(':')?;
            Some((param.trim().to_string(), constraint.trim().to_string()))
        })
        .collect()
}

/// Type parameters of a member header such as
/// `void Run<T>(T item) where T : new()` or `run<T extends Item>(item: T)`.
pub fn member_type_parameters(header: &str, member_name: &str) -> Vec<TypeParameter> {
    let Some(rest) = header
        .match_indices(member_name)
        .filter(|&(i, _)| is_word_at(header, i, member_name))
        .map(|(i, _)| header[i + member_name.len()..].trim_start())
        .find(|rest| rest.starts_with('<'))
    else {
        return Vec::new();
    };
    let Some(close) = closing_angle(rest) else {
        return Vec::new();
    };
    let constraints = where_clauses(&rest[close + 1..]);

    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut last = 1;
    let mut prev = '<';
    for (i, ch) in rest[..=close].char_indices().skip(1) {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if prev == '=' => {}
            '>' | ')' | ']' | '}' if i != close => depth -= 1,
            _ => {}
        }
        prev = ch;
        if (ch == ',' && depth == 0) || i == close {
            let declaration = rest[last..i].trim();
            let declaration = match declaration.strip_prefix('[') {
                Some(attributed) => attributed.split_once(']').map_or("", |(_, d)| d.trim()),
                None => declaration,
            };
            last = i + 1;
            let mut names = words(declaration).filter(|w| !matches!(*w, "in" | "out" | "const"));
            let Some(name) = names.next() else {
                continue;
            };
            let constraint = constraints
                .iter()
                .find(|(p, _)| p == name)
                .map(|(_, c)| c.clone());
            params.push(TypeParameter {
                name: name.to_string(),
                declaration: declaration.to_string(),
                constraint,
            });
        }
    }
    params
}

/// The entries of `available` the generated signature needs: those named in
/// a parameter, local or return type, plus those their own declarations and
/// constraints mention.
fn referenced_type_parameters<'p>(
    available: &'p [TypeParameter],
    mapping: &VariableHandlingMapping,
) -> Vec<&'p TypeParameter> {
    if available.is_empty() {
        return Vec::new();
    }
    let mut mentioned: Vec<&str> = mapping
        .parameters_to_pass
        .iter()
        .chain(&mapping.locals_to_introduce)
        .filter_map(|v| v.inferred_type.as_deref())
        .chain(std::iter::once(mapping.suggested_return_type.as_str()))
        .flat_map(words)
        .collect();
    let mut used = vec![false; available.len()];
    loop {
        let mut grew = false;
        for (i, tp) in available.iter().enumerate() {
            if !used[i] && mentioned.contains(&tp.name.as_str()) {
                used[i] = true;
                grew = true;
                mentioned.extend(words(&tp.declaration));
                mentioned.extend(tp.constraint.as_deref().into_iter().flat_map(words));
            }
        }
        if !grew {
            break;
        }
    }
    available
        .iter()
        .zip(used)
        .filter_map(|(tp, u)| u.then_some(tp))
        .collect()
}

/// `<T, U>` and the trailing `where` clauses for the used type parameters.
fn generic_parts(used: &[&TypeParameter]) -> (String, String) {
    if used.is_empty() {
        return (String::new(), String::new());
    }
    let list = used
        .iter()
        .map(|tp| tp.declaration.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let clauses: String = used
        .iter()
        .filter_map(|tp| {
            tp.constraint
                .as_ref()
                .map(|c| format!(" where {} : {}", tp.name, c))
        })
        .collect();
    (format!("<{}>", list), clauses)
}

// ============================================================================
// Signature
// ============================================================================

/// What the signature declares besides its parameters.
#[derive(Debug, Clone, Copy)]
pub struct SignatureParts<'a> {
    pub name: &'a str,
    pub access: &'a str,
    pub is_static: bool,
    /// Emit a free function rather than a class member.
    pub free_function: bool,
    /// Type parameters in scope at the selection; only the referenced ones
    /// are declared.
    pub type_parameters: &'a [TypeParameter],
}

/// Method header without braces.
pub fn build_signature(
    parts: &SignatureParts<'_>,
    mapping: &VariableHandlingMapping,
    spec: &LanguageSpec,
) -> String {
    let params = parameter_list(mapping, spec);
    let used = referenced_type_parameters(parts.type_parameters, mapping);
    let (generics, clauses) = generic_parts(&used);
    let return_type = if mapping.suggested_return_type.trim().is_empty() {
        spec.types.void.to_string()
    } else {
        mapping.suggested_return_type.clone()
    };
    match spec.annotation {
        AnnotationStyle::Prefix => {
            let mut words: Vec<&str> = Vec::new();
            if !parts.access.is_empty() {
                words.push(parts.access);
            }
            if parts.is_static {
                words.push("static");
            }
            words.push(&return_type);
            format!(
                "{} {}{}({}){}",
                words.join(" "),
                parts.name,
                generics,
                params,
                clauses
            )
        }
        AnnotationStyle::Suffix if parts.free_function => {
            format!("function {}{}({}): {}", parts.name, generics, params, return_type)
        }
        AnnotationStyle::Suffix => {
            let mut words: Vec<&str> = Vec::new();
            if !parts.access.is_empty() {
                words.push(parts.access);
            }
            if parts.is_static {
                words.push("static");
            }
            words.push(parts.name);
            format!("{}{}({}): {}", words.join(" "), generics, params, return_type)
        }
    }
}

/// `return …;` for a non-void mapping.
pub fn return_statement(mapping: &VariableHandlingMapping, spec: &LanguageSpec) -> Option<String> {
    match mapping.return_names().as_slice() {
        [] => None,
        [single] => Some(format!("return {};", single)),
        many => {
            let joined = many.join(", ");
            Some(match spec.tuple {
                TupleStyle::Parenthesized => format!("return ({});", joined),
                TupleStyle::Bracketed => format!("return [{}];", joined),
            })
        }
    }
}

/// Declarations for variables the method must declare before the body.
fn introduced_locals(mapping: &VariableHandlingMapping, spec: &LanguageSpec) -> Vec<String> {
    mapping
        .locals_to_introduce
        .iter()
        .map(|v| match spec.annotation {
            AnnotationStyle::Prefix => format!("{};", typed_binding(v, spec)),
            AnnotationStyle::Suffix => format!("let {};", typed_binding(v, spec)),
        })
        .collect()
}

/// The generated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMethod {
    pub signature: String,
    /// Indented body lines, including introduced locals and the return.
    pub body_lines: Vec<String>,
    /// Signature, braces and body, ready to insert.
    pub method_lines: Vec<String>,
}

impl GeneratedMethod {
    pub fn body_text(&self) -> String {
        self.body_lines.join("\n")
    }

    pub fn method_text(&self) -> String {
        self.method_lines.join("\n")
    }
}

/// Build the method from the selected source lines.
///
/// With `verbatim` set (analysis fell back) the block is embedded as is and
/// nothing is declared or returned, whatever the mapping says.
pub fn generate_method(
    selected: &[String],
    parts: &SignatureParts<'_>,
    mapping: &VariableHandlingMapping,
    layout: &MethodLayout,
    spec: &LanguageSpec,
    verbatim: bool,
) -> ExtractMethodResult<GeneratedMethod> {
    if selected.iter().all(|l| l.trim().is_empty()) {
        return Err(ExtractMethodError::EmptyFragment {
            fragment: "body".to_string(),
        });
    }
    let fallback;
    let mapping = if verbatim {
        fallback = VariableHandlingMapping::fallback(spec.types.void);
        &fallback
    } else {
        mapping
    };

    let signature = build_signature(parts, mapping, spec);
    if parts.name.is_empty() {
        return Err(ExtractMethodError::EmptyFragment {
            fragment: "signature".to_string(),
        });
    }

    let body_indent = layout.body_indent();
    let mut body_lines: Vec<String> = introduced_locals(mapping, spec)
        .into_iter()
        .map(|decl| format!("{}{}", body_indent, decl))
        .collect();
    body_lines.extend(reindent(selected, &body_indent));
    if let Some(ret) = return_statement(mapping, spec) {
        body_lines.push(format!("{}{}", body_indent, ret));
    }

    let indent = &layout.member_indent;
    let mut method_lines = Vec::with_capacity(body_lines.len() + 3);
    if layout.allman {
        method_lines.push(format!("{}{}", indent, signature));
        method_lines.push(format!("{}{{", indent));
    } else {
        method_lines.push(format!("{}{} {{", indent, signature));
    }
    method_lines.extend(body_lines.iter().cloned());
    method_lines.push(format!("{}}}", indent));

    Ok(GeneratedMethod {
        signature,
        body_lines,
        method_lines,
    })
}
