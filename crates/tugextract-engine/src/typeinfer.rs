// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type inference for parameters and returned values.
//!
//! Evidence is tried in order: the declared type, the initializer
//! expression, then the variable's name. Name-based inference is an ordered
//! rule table ([`NAME_RULES`]); the first matching rule wins. When nothing
//! matches the caller falls back to the language's object type.

use crate::patterns::{LanguageSpec, TypeVocabulary};

/// Language-neutral type class, spelled per language by [`TypeClass::spell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Char,
    Bool,
    Date,
    List,
}

impl TypeClass {
    pub fn spell(&self, vocab: &TypeVocabulary) -> &'static str {
        match self {
            TypeClass::Int => vocab.int,
            TypeClass::Long => vocab.long,
            TypeClass::Float => vocab.float,
            TypeClass::Double => vocab.double,
            TypeClass::Decimal => vocab.decimal,
            TypeClass::String => vocab.string,
            TypeClass::Char => vocab.char,
            TypeClass::Bool => vocab.boolean,
            TypeClass::Date => vocab.date,
            TypeClass::List => vocab.list,
        }
    }
}

// ============================================================================
// Name rules
// ============================================================================

/// One name heuristic.
///
/// `prefixes` match at a word boundary (`isReady`, `has_items`), `suffixes`
/// match a trailing camel-case or snake-case word (`itemCount`, `file_path`),
/// `exact` matches the whole name. All comparisons ignore case.
#[derive(Debug)]
pub struct NameRule {
    pub class: TypeClass,
    pub prefixes: &'static [&'static str],
    pub suffixes: &'static [&'static str],
    pub exact: &'static [&'static str],
}

pub static NAME_RULES: &[NameRule] = &[
    NameRule {
        class: TypeClass::Bool,
        prefixes: &["is", "has", "can", "should", "was", "will", "did", "allow", "needs"],
        suffixes: &["Enabled", "Visible", "Valid", "Found"],
        exact: &["found", "done", "valid", "enabled", "visible", "success", "ok", "flag"],
    },
    NameRule {
        class: TypeClass::Int,
        prefixes: &["num"],
        suffixes: &["Count", "Index", "Length", "Size", "Idx"],
        exact: &["i", "j", "k", "n", "idx", "index", "count", "len", "length", "size", "num"],
    },
    NameRule {
        class: TypeClass::String,
        prefixes: &[],
        suffixes: &["Name", "Title", "Text", "Message", "Path", "Url", "Key", "Label", "Str"],
        exact: &[
            "name", "title", "text", "message", "msg", "path", "url", "key", "label",
            "description", "str", "s", "line", "word", "prefix", "suffix", "format",
        ],
    },
    NameRule {
        class: TypeClass::Decimal,
        prefixes: &[],
        suffixes: &["Price", "Amount", "Cost", "Balance", "Total", "Tax", "Fee"],
        exact: &[
            "price", "amount", "cost", "balance", "total", "subtotal", "tax", "fee", "salary",
            "discount",
        ],
    },
    NameRule {
        class: TypeClass::Date,
        prefixes: &[],
        suffixes: &["Date", "Time", "At"],
        exact: &["date", "time", "timestamp", "now", "deadline"],
    },
    NameRule {
        class: TypeClass::Double,
        prefixes: &[],
        suffixes: &["Ratio", "Percent", "Average", "Score", "Rate"],
        exact: &[
            "ratio", "percent", "percentage", "average", "avg", "score", "rate", "weight",
            "factor",
        ],
    },
    NameRule {
        class: TypeClass::List,
        prefixes: &[],
        suffixes: &["List", "Items"],
        exact: &["items", "list", "values", "results", "elements", "entries"],
    },
];

fn prefix_matches(name: &str, prefix: &str) -> bool {
    if name.len() <= prefix.len() || !name.to_ascii_lowercase().starts_with(prefix) {
        return false;
    }
    name[prefix.len()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c == '_')
}

fn suffix_matches(name: &str, suffix: &str) -> bool {
    if name.len() <= suffix.len() {
        return false;
    }
    let split = name.len() - suffix.len();
    let Some(tail) = name.get(split..) else {
        return false;
    };
    if !tail.eq_ignore_ascii_case(suffix) {
        return false;
    }
    let boundary_upper = tail.chars().next().is_some_and(char::is_uppercase);
    boundary_upper || name[..split].ends_with('_')
}

impl NameRule {
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.exact.contains(&lower.as_str())
            || self.prefixes.iter().any(|p| prefix_matches(name, p))
            || self.suffixes.iter().any(|s| suffix_matches(name, s))
    }
}

/// Type class suggested by a variable's name, if any rule matches.
pub fn infer_class_from_name(name: &str) -> Option<TypeClass> {
    let name = name.trim_start_matches('@');
    NAME_RULES.iter().find(|r| r.matches(name)).map(|r| r.class)
}

pub fn infer_from_name(name: &str, spec: &LanguageSpec) -> Option<String> {
    infer_class_from_name(name).map(|c| c.spell(&spec.types).to_string())
}

// ============================================================================
// Initializers
// ============================================================================

fn numeric_class(text: &str) -> Option<TypeClass> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let first = body.chars().next()?;
    if !first.is_ascii_digit() {
        return None;
    }
    if body.starts_with("0x") || body.starts_with("0X") || body.starts_with("0b") {
        return Some(TypeClass::Int);
    }
    let digits_end = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '_' || c == 'e' || c == 'E'))
        .unwrap_or(body.len());
    let (number, suffix) = body.split_at(digits_end);
    if number.ends_with(['e', 'E']) && !suffix.is_empty() {
        return None;
    }
    let fractional = number.contains('.') || number.contains(['e', 'E']);
    match suffix.to_ascii_lowercase().as_str() {
        "m" => Some(TypeClass::Decimal),
        "f" => Some(TypeClass::Float),
        "d" => Some(TypeClass::Double),
        "l" | "ul" | "lu" => Some(TypeClass::Long),
        "n" => Some(TypeClass::Long),
        "u" | "" if !fractional => Some(TypeClass::Int),
        "" => Some(TypeClass::Double),
        _ => None,
    }
}

/// Type named by a constructor call: `new T(...)`, `new T<U>()`, `new T[n]`.
fn constructed_type(init: &str) -> Option<String> {
    let rest = init.strip_prefix("new")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let mut depth = 0usize;
    let mut end = rest.len();
    for (i, ch) in rest.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '(' | '{' | '[' if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let ty = rest[..end].trim();
    if ty.is_empty() {
        return None;
    }
    if rest[end..].starts_with('[') {
        Some(format!("{}[]", ty))
    } else {
        Some(ty.to_string())
    }
}

fn is_boolean_expression(init: &str) -> bool {
    ["==", "!=", "<=", ">=", "&&", "||", " < ", " > ", " is ", " instanceof "]
        .iter()
        .any(|op| init.contains(op))
        || (init.starts_with('!') && !init.starts_with("!="))
}

/// Infer a type from an initializer expression.
///
/// `init` is sanitized text (string contents blanked, quotes kept).
/// `lookup` returns the already-known type of another variable.
pub fn infer_from_initializer<F>(init: &str, spec: &LanguageSpec, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let init = init.trim().trim_end_matches(';').trim();
    if init.is_empty() {
        return None;
    }
    let t = &spec.types;
    let spelled = |c: TypeClass| Some(c.spell(t).to_string());

    if init.starts_with('"') || init.starts_with("$\"") || init.starts_with("@\"") {
        return if init.ends_with('"') || init.contains("\" +") {
            spelled(TypeClass::String)
        } else {
            None
        };
    }
    if init.starts_with('`') {
        return spelled(TypeClass::String);
    }
    if init.starts_with('\'') && init.ends_with('\'') {
        return spelled(TypeClass::Char);
    }
    match init {
        "true" | "false" => return spelled(TypeClass::Bool),
        "null" | "undefined" | "default" => return None,
        _ => {}
    }
    if let Some(class) = numeric_class(init) {
        return spelled(class);
    }
    if let Some(ty) = constructed_type(init) {
        return Some(ty);
    }
    if is_boolean_expression(init) {
        return spelled(TypeClass::Bool);
    }
    if init.ends_with(".Count")
        || init.ends_with(".Length")
        || init.ends_with(".length")
        || init.ends_with(".Count()")
        || init.ends_with(".size")
    {
        return spelled(TypeClass::Int);
    }
    if init.ends_with(".ToString()")
        || init.ends_with(".toString()")
        || init.starts_with("string.")
        || init.starts_with("String.Format")
        || init.starts_with("String.Join")
        || init.contains(".join(")
        || init.ends_with(".Trim()")
        || init.ends_with(".trim()")
    {
        return spelled(TypeClass::String);
    }
    if init.starts_with("Math.") || init.starts_with("parseFloat(") {
        return spelled(TypeClass::Double);
    }
    if init.starts_with("parseInt(") || init.starts_with("int.Parse(") {
        return spelled(TypeClass::Int);
    }
    if init.starts_with('[') && spec.tuple == crate::patterns::TupleStyle::Bracketed {
        return spelled(TypeClass::List);
    }

    // `other` or `other * 2`: take the type of a known variable.
    let ident_end = init
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '@'))
        .unwrap_or(init.len());
    let (ident, rest) = init.split_at(ident_end);
    let rest = rest.trim_start();
    if !ident.is_empty()
        && (rest.is_empty() || rest.starts_with(['+', '-', '*', '/', '%']))
    {
        if let Some(ty) = lookup(ident) {
            return Some(ty);
        }
    }
    None
}

// ============================================================================
// Cleaning
// ============================================================================

/// Normalize a type as written in source.
///
/// Collapses whitespace, attaches nullable and array markers, and returns
/// `None` for placeholders (`var`, `let`, `const`) that are not real types.
pub fn clean_type(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut cleaned = collapsed
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ?", "?")
        .replace(" [", "[")
        .replace("[ ", "[")
        .replace(" ]", "]")
        .replace(" ,", ",");
    cleaned = cleaned.replace(", ", ",").replace(',', ", ");
    let cleaned = cleaned.trim().to_string();
    match cleaned.as_str() {
        "" | "var" | "let" | "const" => None,
        _ => Some(cleaned),
    }
}

/// Full inference chain: declared type, initializer, name.
pub fn infer_type<F>(
    declared: Option<&str>,
    initializer: Option<&str>,
    name: &str,
    spec: &LanguageSpec,
    lookup: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    declared
        .and_then(clean_type)
        .or_else(|| initializer.and_then(|init| infer_from_initializer(init, spec, &lookup)))
        .or_else(|| infer_from_name(name, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{CSHARP, TYPESCRIPT};

    fn none(_: &str) -> Option<String> {
        None
    }

    mod names {
        use super::*;

        #[test]
        fn rule_order_first_match_wins() {
            assert_eq!(infer_class_from_name("isReady"), Some(TypeClass::Bool));
            assert_eq!(infer_class_from_name("itemCount"), Some(TypeClass::Int));
            assert_eq!(infer_class_from_name("fileName"), Some(TypeClass::String));
            assert_eq!(infer_class_from_name("unitPrice"), Some(TypeClass::Decimal));
            assert_eq!(infer_class_from_name("createdAt"), Some(TypeClass::Date));
            assert_eq!(infer_class_from_name("hitRatio"), Some(TypeClass::Double));
            assert_eq!(infer_class_from_name("items"), Some(TypeClass::List));
        }

        #[test]
        fn boundaries_required() {
            assert_eq!(infer_class_from_name("island"), None);
            assert_eq!(infer_class_from_name("hash"), None);
            assert_eq!(infer_class_from_name("format_path"), Some(TypeClass::String));
            assert_eq!(infer_class_from_name("that"), None);
        }

        #[test]
        fn exact_matches_ignore_case() {
            assert_eq!(infer_class_from_name("Total"), Some(TypeClass::Decimal));
            assert_eq!(infer_class_from_name("i"), Some(TypeClass::Int));
            assert_eq!(infer_class_from_name("@name"), Some(TypeClass::String));
        }

        #[test]
        fn spelled_per_language() {
            assert_eq!(infer_from_name("isOpen", &CSHARP).as_deref(), Some("bool"));
            assert_eq!(infer_from_name("isOpen", &TYPESCRIPT).as_deref(), Some("boolean"));
            assert_eq!(infer_from_name("price", &TYPESCRIPT).as_deref(), Some("number"));
            assert_eq!(infer_from_name("zzz", &CSHARP), None);
        }
    }

    mod initializers {
        use super::*;

        fn cs(init: &str) -> Option<String> {
            infer_from_initializer(init, &CSHARP, none)
        }

        #[test]
        fn literals() {
            assert_eq!(cs("1").as_deref(), Some("int"));
            assert_eq!(cs("1.5").as_deref(), Some("double"));
            assert_eq!(cs("1.5m").as_deref(), Some("decimal"));
            assert_eq!(cs("2f").as_deref(), Some("float"));
            assert_eq!(cs("10L").as_deref(), Some("long"));
            assert_eq!(cs("\"   \"").as_deref(), Some("string"));
            assert_eq!(cs("' '").as_deref(), Some("char"));
            assert_eq!(cs("true;").as_deref(), Some("bool"));
            assert_eq!(cs("null"), None);
        }

        #[test]
        fn constructors() {
            assert_eq!(cs("new List<int>()").as_deref(), Some("List<int>"));
            assert_eq!(cs("new Order { Id = 1 }").as_deref(), Some("Order"));
            assert_eq!(cs("new int[10]").as_deref(), Some("int[]"));
            assert_eq!(cs("new()"), None);
        }

        #[test]
        fn expressions() {
            assert_eq!(cs("a == b").as_deref(), Some("bool"));
            assert_eq!(cs("items.Count").as_deref(), Some("int"));
            assert_eq!(cs("value.ToString()").as_deref(), Some("string"));
            assert_eq!(cs("Math.Sqrt(x)").as_deref(), Some("double"));
        }

        #[test]
        fn known_variable_types_flow() {
            let lookup = |n: &str| (n == "total").then(|| "decimal".to_string());
            assert_eq!(
                infer_from_initializer("total * 2", &CSHARP, lookup).as_deref(),
                Some("decimal")
            );
            assert_eq!(infer_from_initializer("total.Foo()", &CSHARP, lookup), None);
        }

        #[test]
        fn typescript_spellings() {
            let ts = |i: &str| infer_from_initializer(i, &TYPESCRIPT, none);
            assert_eq!(ts("0").as_deref(), Some("number"));
            assert_eq!(ts("`  `").as_deref(), Some("string"));
            assert_eq!(ts("[]").as_deref(), Some("any[]"));
            assert_eq!(ts("new Map<string, number>()").as_deref(), Some("Map<string, number>"));
        }
    }

    #[test]
    fn clean_type_normalizes() {
        assert_eq!(
            clean_type("  Dictionary < string ,int >").as_deref(),
            Some("Dictionary<string, int>")
        );
        assert_eq!(clean_type("int ?").as_deref(), Some("int?"));
        assert_eq!(clean_type("string [ ]").as_deref(), Some("string[]"));
        assert_eq!(clean_type("var"), None);
        assert_eq!(clean_type("  "), None);
    }

    #[test]
    fn inference_chain_order() {
        assert_eq!(
            infer_type(Some("long"), Some("1"), "count", &CSHARP, none).as_deref(),
            Some("long")
        );
        assert_eq!(
            infer_type(Some("var"), Some("1.5m"), "count", &CSHARP, none).as_deref(),
            Some("decimal")
        );
        assert_eq!(
            infer_type(Some("var"), Some("Compute()"), "count", &CSHARP, none).as_deref(),
            Some("int")
        );
        assert_eq!(infer_type(None, None, "thing", &CSHARP, none), None);
    }
}
