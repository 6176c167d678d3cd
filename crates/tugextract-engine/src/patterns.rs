// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-language scanning tables.
//!
//! Each supported language is described by one [`LanguageSpec`]: regex
//! sources for scope recognition and declaration finding, keyword and
//! built-in sets, type spellings, and syntax style flags. The scope adapter
//! compiles these once per language; nothing else in the engine branches on
//! the language tag.
//!
//! All patterns run against sanitized lines (see [`crate::lexer`]), so they
//! never see comment text or string contents.

/// How a language writes a typed binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStyle {
    /// `int count`
    Prefix,
    /// `count: number`
    Suffix,
}

/// How a language spells multi-value returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleStyle {
    /// `(a, b)` and `(int, string)`
    Parenthesized,
    /// `[a, b]` and `[number, string]`
    Bracketed,
}

/// Type spellings used by inference.
#[derive(Debug, Clone, Copy)]
pub struct TypeVocabulary {
    pub int: &'static str,
    pub long: &'static str,
    pub float: &'static str,
    pub double: &'static str,
    pub decimal: &'static str,
    pub string: &'static str,
    pub char: &'static str,
    pub boolean: &'static str,
    pub date: &'static str,
    pub list: &'static str,
    pub object: &'static str,
    pub void: &'static str,
}

/// Scanning tables for one language.
#[derive(Debug)]
pub struct LanguageSpec {
    /// Namespace / module header. Capture 1: name.
    pub module: &'static str,
    /// Class / struct / interface / enum header. Capture 1: name.
    pub type_decl: &'static str,
    /// Method header inside a type body. Capture 1: name.
    pub method: &'static str,
    /// Constructor header inside a type body. Capture 1: name.
    pub constructor: Option<&'static str>,
    /// Property accessor inside a type body (`get`, `set`). Capture 1: name.
    pub accessor: Option<&'static str>,
    /// Method written as an arrow-function property. Capture 1: name.
    pub arrow_method: Option<&'static str>,
    /// Free function header. Capture 1: name.
    pub function: Option<&'static str>,
    /// Arrow function bound to a variable. Capture 1: name.
    pub arrow_function: Option<&'static str>,
    /// Statement that opens a block. Capture 1: keyword.
    pub block_opener: &'static str,
    /// Any line mentioning a type keyword (insertion fallback).
    pub type_keyword_line: &'static str,
    /// Identifier token.
    pub identifier: &'static str,
    /// Local declaration statement. Named groups `ty`, `name`, optional `kw`.
    pub declaration: &'static str,
    /// Destructuring declarations. Group 1: keyword, group 2: name list.
    pub destructuring: &'static [&'static str],
    /// Exception variable. Optional group `ty`, group `name`.
    pub catch_binding: &'static str,
    /// Pattern variable (`x is Foo f`). Groups `ty`, `name`.
    pub pattern_binding: Option<&'static str>,
    /// Declaration through an out argument. Groups `ty`, `name`.
    pub out_binding: Option<&'static str>,
    /// Field or property at type-body depth. Capture 1: name.
    pub field: Option<&'static str>,
    /// Module-level symbol (import, top-level binding). Capture 1: names.
    pub module_symbol: Option<&'static str>,
    /// Lambda with a single bare parameter. Capture 1: name.
    pub lambda_single: &'static str,
    /// Lambda or anonymous function parameter list. Capture 1: list.
    pub lambda_list: &'static str,
    /// Reserved words, never variables.
    pub keywords: &'static [&'static str],
    /// Reserved words that may stand in type position (`int`, `string`).
    pub type_keywords: &'static [&'static str],
    /// Built-in type and global names, never variables.
    pub builtins: &'static [&'static str],
    /// Default receivers of static calls, never variables.
    pub known_static_types: &'static [&'static str],
    /// Keywords that start a loop.
    pub loop_keywords: &'static [&'static str],
    /// Access modifiers accepted for the new method.
    pub access_modifiers: &'static [&'static str],
    /// Access modifier used when the request leaves it empty.
    pub default_access: &'static str,
    /// Keyword introducing a typed local at call sites (`var`), if any.
    pub call_site_declaration: &'static str,
    /// Name of the constructor method, when fixed by the language.
    pub constructor_name: Option<&'static str>,
    pub annotation: AnnotationStyle,
    pub tuple: TupleStyle,
    pub types: TypeVocabulary,
    /// Members are reachable without `this.` (so unqualified names may be fields).
    pub implicit_member_access: bool,
    /// Functions can exist outside any type.
    pub free_functions: bool,
    /// Brace on its own line when there is no member to copy from.
    pub allman_default: bool,
    /// `#` at line start is a preprocessor directive.
    pub hash_directives: bool,
    /// Verbatim (`@"..."`) and interpolated (`$"..."`) string prefixes.
    pub prefixed_strings: bool,
    /// Backtick template literals with `${}` holes.
    pub template_literals: bool,
}

// ============================================================================
// C#
// ============================================================================

pub static CSHARP: LanguageSpec = LanguageSpec {
    module: r"^namespace\s+([\w.]+)",
    type_decl: concat!(
        r"^(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|sealed|abstract|",
        r"partial|readonly|unsafe|new|file|ref)\s+)*(?:class|struct|interface|enum|",
        r"record(?:\s+(?:class|struct))?)\s+(\w+)",
    ),
    method: concat!(
        r"^(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|override|",
        r"abstract|sealed|async|extern|unsafe|new|partial|readonly)\s+)*[\w.<>\[\],?()",
        r"\s]*?[\w>\]?)]\s+(\w+)\s*(?:<[^>]*>)?\s*\(",
    ),
    constructor: Some(
        concat!(
            r"^(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|extern|unsafe)\s+)",
            r"*(\w+)\s*\(",
        ),
    ),
    accessor: Some(r"^(?:(?:public|private|protected|internal)\s+)*(get|set|init|add|remove)\b"),
    arrow_method: None,
    function: None,
    arrow_function: None,
    block_opener: concat!(
        r"^(else\s+if|if|else|for|foreach|while|do|try|catch|finally|switch|using|lock|fixed|",
        r"unsafe|checked|unchecked)\b",
    ),
    type_keyword_line: r"\b(?:class|struct|record|interface)\s+\w+",
    identifier: r"@?[\p{XID_Start}_]\p{XID_Continue}*",
    declaration: concat!(
        r"(?:^\s*|[(;]\s*)(?:(?:const|readonly|ref|scoped|static|using|await\s+using)\s+)",
        r"*(?P<ty>var|\([^()]*\)|[\p{XID_Start}_][\w.]*(?:\s*<[\w\s,.?\[\]<>()]*>)",
        r"?(?:\s*\[[\s,]*\])*\??(?:\s*\[[\s,]*\])*)\s+(?P<name>@?[\p{XID_Start}_]\p{XID_Continue}*",
        r")\s*(?:=(?:[^=>]|$)|;|,|\bin\b)",
    ),
    destructuring: &[r"\b(var)\s*\(([^()]*)\)\s*=(?:[^=>]|$)"],
    catch_binding: r"\bcatch\s*\(\s*(?P<ty>[\w.<>]+)\s+(?P<name>\w+)\s*\)",
    pattern_binding: Some(concat!(
        r"\bis\s+(?:not\s+)?(?P<ty>[\p{XID_Start}_][\w.<>]*)",
        r"\s+(?P<name>@?[\p{XID_Start}_]\p{XID_Continue}*)",
    )),
    out_binding: Some(concat!(
        r"\bout\s+(?P<ty>var|[\p{XID_Start}_][\w.<>\[\]?]*)",
        r"\s+(?P<name>@?[\p{XID_Start}_]\p{XID_Continue}*)",
    )),
    field: Some(
        concat!(
            r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|readonly|const|",
            r"volatile|new|required|override|virtual|abstract|sealed|event)\s+)*[\w.<>\[\],?()",
            r"\s]*?[\w>\]?)]\s+(@?[\p{XID_Start}_]\p{XID_Continue}*)\s*(?:=|;|\{|$)",
        ),
    ),
    module_symbol: None,
    lambda_single: r"(@?[\p{XID_Start}_]\p{XID_Continue}*)\s*=>",
    lambda_list: r"\(([^()]*)\)\s*=>",
    keywords: &[
        "abstract", "as", "async", "await", "base", "bool", "break", "byte", "case", "catch",
        "char", "checked", "class", "const", "continue", "decimal", "default", "delegate", "do",
        "double", "dynamic", "else", "enum", "event", "explicit", "extern", "false", "finally",
        "fixed", "float", "for", "foreach", "goto", "if", "implicit", "in", "int", "interface",
        "internal", "is", "lock", "long", "nameof", "namespace", "new", "not", "null", "object",
        "operator", "out", "override", "params", "private", "protected", "public", "readonly",
        "record", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
        "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
        "unchecked", "unsafe", "ushort", "using", "var", "virtual", "void", "volatile", "when",
        "where", "while", "yield", "and", "or", "with", "init", "get", "set", "nint", "nuint",
    ],
    type_keywords: &[
        "bool", "byte", "char", "decimal", "double", "dynamic", "float", "int", "long", "nint",
        "nuint", "object", "sbyte", "short", "string", "uint", "ulong", "ushort", "var",
    ],
    builtins: &[
        "String", "Int32", "Int64", "Boolean", "Object", "Double", "Decimal", "Single", "Char",
        "Byte", "DateTime", "TimeSpan", "Guid", "Task", "List", "Dictionary", "IEnumerable",
        "Action", "Func", "Exception",
    ],
    known_static_types: &[
        "Console", "Math", "String", "Convert", "DateTime", "Guid", "Enumerable", "File", "Path",
        "Directory", "Environment", "Task", "Debug", "Trace", "Activator", "Array", "Encoding",
        "TimeSpan", "Int32", "Double", "Decimal", "Boolean", "Char", "Nullable", "Regex",
        "Thread", "Interlocked", "Parallel", "JsonSerializer", "StringComparer", "Enum", "GC",
        "Buffer", "BitConverter", "Uri", "Process",
    ],
    loop_keywords: &["for", "foreach", "while", "do"],
    access_modifiers: &[
        "private",
        "protected",
        "internal",
        "public",
        "protected internal",
        "private protected",
    ],
    default_access: "private",
    call_site_declaration: "var",
    constructor_name: None,
    annotation: AnnotationStyle::Prefix,
    tuple: TupleStyle::Parenthesized,
    types: TypeVocabulary {
        int: "int",
        long: "long",
        float: "float",
        double: "double",
        decimal: "decimal",
        string: "string",
        char: "char",
        boolean: "bool",
        date: "DateTime",
        list: "List<object>",
        object: "object",
        void: "void",
    },
    implicit_member_access: true,
    free_functions: false,
    allman_default: true,
    hash_directives: true,
    prefixed_strings: true,
    template_literals: false,
};

// ============================================================================
// TypeScript / JavaScript
// ============================================================================

pub static TYPESCRIPT: LanguageSpec = LanguageSpec {
    module: r"^(?:export\s+)?(?:declare\s+)?(?:namespace|module)\s+([\w.]+)",
    type_decl: concat!(
        r"^(?:@\w+(?:\([^)]*\))?\s*)*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)",
        r"?(?:const\s+)?(?:class|interface|enum)\s+(\w+)",
    ),
    method: concat!(
        r"^(?:@\w+(?:\([^)]*\))?\s*)*(?:(?:public|private|protected|static|async|override|",
        r"abstract|readonly|get|set|declare)\s+)*\*?\s*(#?\w+)\s*\??\s*(?:<[^>]*>)?\s*\(",
    ),
    constructor: None,
    accessor: None,
    arrow_method: Some(
        concat!(
            r"^(?:(?:public|private|protected|static|readonly|override)\s+)*(#?\w+)\s*(?::[^=]+)",
            r"?=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*(?::\s*[^=]+?)?\s*=>",
        ),
    ),
    function: Some(
        r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(\w+)\s*(?:<[^>]*>)?\s*\(",
    ),
    arrow_function: Some(
        concat!(
            r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|",
            r"\w+)\s*(?::\s*[^=]+?)?\s*=>",
        ),
    ),
    block_opener: r"^(else\s+if|if|else|for|while|do|try|catch|finally|switch|with)\b",
    type_keyword_line: r"\bclass\s+\w+",
    identifier: r"[\p{XID_Start}_$][\p{XID_Continue}$]*",
    declaration: concat!(
        r"\b(?P<kw>const|let|var)\s+(?P<name>[\p{XID_Start}_$][\p{XID_Continue}$]*)",
        r"\s*(?::\s*(?P<ty>[^=;]+?))?\s*(?:=(?:[^=>]|$)|;|,|$|\bof\b|\bin\b)",
    ),
    destructuring: &[
        r"\b(const|let|var)\s*\{([^}]*)\}\s*(?::[^=]+)?(?:=|\bof\b)",
        r"\b(const|let|var)\s*\[([^\]]*)\]\s*(?::[^=]+)?(?:=|\bof\b)",
    ],
    catch_binding: concat!(
        r"\bcatch\s*\(\s*(?P<name>[\p{XID_Start}_$][\p{XID_Continue}$]*)(?:\s*:\s*(?P<ty>\w+))?",
    ),
    pattern_binding: None,
    out_binding: None,
    field: None,
    module_symbol: Some(
        concat!(
            r"^\s*(?:import\s+(.+?)\s+from\b|import\s+(\w+)\s*=|(?:export\s+)?(?:default\s+)",
            r"?(?:declare\s+)?(?:async\s+)?(?:const|let|var|function\*?|class|enum|interface|type)",
            r"\s+([\p{XID_Start}_$][\p{XID_Continue}$]*))",
        ),
    ),
    lambda_single: r"([\p{XID_Start}_$][\p{XID_Continue}$]*)\s*=>",
    lambda_list: concat!(
        r"(?:\(([^()]*)\)\s*(?::\s*[^=]+?)?\s*=>|\bfunction\s*\*?\s*[\w$]*\s*\(([^()]*)\))",
    ),
    keywords: &[
        "abstract", "any", "as", "async", "await", "boolean", "break", "case", "catch", "class",
        "const", "constructor", "continue", "debugger", "declare", "default", "delete", "do",
        "else", "enum", "export", "extends", "false", "finally", "for", "from", "function", "if",
        "implements", "import", "in", "infer", "instanceof", "interface", "is", "keyof", "let",
        "module", "namespace", "never", "new", "null", "number", "of", "package", "private",
        "protected", "public", "readonly", "return", "satisfies", "static", "string", "super",
        "switch", "symbol", "this", "throw", "true", "try", "type", "typeof", "undefined",
        "unique", "unknown", "var", "void", "while", "with", "yield", "bigint", "object",
    ],
    type_keywords: &[
        "any", "bigint", "boolean", "never", "null", "number", "object", "string", "symbol",
        "undefined", "unknown", "void",
    ],
    builtins: &[
        "Array", "Object", "String", "Number", "Boolean", "Math", "JSON", "Date", "Promise",
        "Map", "Set", "WeakMap", "WeakSet", "Error", "RegExp", "Symbol", "BigInt", "Record",
        "Partial", "Readonly", "console", "window", "document", "globalThis", "process",
        "require", "module", "exports", "parseInt", "parseFloat", "isNaN", "isFinite",
        "setTimeout", "clearTimeout", "setInterval", "clearInterval", "NaN", "Infinity",
        "arguments",
    ],
    known_static_types: &[
        "console", "Math", "JSON", "Object", "Array", "Number", "String", "Boolean", "Promise",
        "Date", "Reflect", "Symbol", "process", "window", "document", "globalThis", "Intl",
    ],
    loop_keywords: &["for", "while", "do"],
    access_modifiers: &["private", "protected", "public"],
    default_access: "private",
    call_site_declaration: "const",
    constructor_name: Some("constructor"),
    annotation: AnnotationStyle::Suffix,
    tuple: TupleStyle::Bracketed,
    types: TypeVocabulary {
        int: "number",
        long: "number",
        float: "number",
        double: "number",
        decimal: "number",
        string: "string",
        char: "string",
        boolean: "boolean",
        date: "Date",
        list: "any[]",
        object: "any",
        void: "void",
    },
    implicit_member_access: false,
    free_functions: true,
    allman_default: false,
    hash_directives: false,
    prefixed_strings: false,
    template_literals: true,
};

impl LanguageSpec {
    /// Whether `word` is a reserved word.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(&word)
    }

    /// Whether `word` is a reserved word usable as a type.
    pub fn is_type_keyword(&self, word: &str) -> bool {
        self.type_keywords.contains(&word)
    }

    /// Whether `word` is a built-in type or global.
    pub fn is_builtin(&self, word: &str) -> bool {
        self.builtins.contains(&word)
    }

    /// Whether `word` is a loop keyword.
    pub fn is_loop_keyword(&self, word: &str) -> bool {
        self.loop_keywords.contains(&word)
    }

    /// Whether `modifier` is an accepted access modifier.
    pub fn accepts_access(&self, modifier: &str) -> bool {
        let normalized = modifier.split_whitespace().collect::<Vec<_>>().join(" ");
        self.access_modifiers.contains(&normalized.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn compile(src: &str) -> Regex {
        Regex::new(src).unwrap_or_else(|e| panic!("pattern failed to compile: {src}: {e}"))
    }

    #[test]
    fn every_pattern_compiles() {
        for spec in [&CSHARP, &TYPESCRIPT] {
            let mut sources = vec![
                spec.module,
                spec.type_decl,
                spec.method,
                spec.block_opener,
                spec.type_keyword_line,
                spec.identifier,
                spec.declaration,
                spec.catch_binding,
                spec.lambda_single,
                spec.lambda_list,
            ];
            sources.extend(spec.destructuring.iter().copied());
            sources.extend(
                [
                    spec.constructor,
                    spec.accessor,
                    spec.arrow_method,
                    spec.function,
                    spec.arrow_function,
                    spec.pattern_binding,
                    spec.out_binding,
                    spec.field,
                    spec.module_symbol,
                ]
                .into_iter()
                .flatten(),
            );
            for src in sources {
                compile(src);
            }
        }
    }

    #[test]
    fn csharp_method_header() {
        let re = compile(CSHARP.method);
        let caps = re.captures("public static int Compute(int a)").unwrap();
        assert_eq!(&caps[1], "Compute");
        let caps = re.captures("private List<string> Names<T>(T x)").unwrap();
        assert_eq!(&caps[1], "Names");
        assert!(re.captures("private int count = Compute(1);").is_none());
    }

    #[test]
    fn csharp_declarations() {
        let re = compile(CSHARP.declaration);
        let caps = re.captures("        var total = 0;").unwrap();
        assert_eq!(&caps["ty"], "var");
        assert_eq!(&caps["name"], "total");
        let caps = re.captures("Dictionary<string, int> map = new();").unwrap();
        assert_eq!(&caps["name"], "map");
        let caps = re.captures("foreach (var item in items)").unwrap();
        assert_eq!(&caps["name"], "item");
        assert!(re.captures("total = total + 1;").is_none());
        assert!(re.captures("if (a == b)").is_none());
    }

    #[test]
    fn typescript_declarations() {
        let re = compile(TYPESCRIPT.declaration);
        let caps = re.captures("    const count: number = items.length;").unwrap();
        assert_eq!(&caps["kw"], "const");
        assert_eq!(&caps["name"], "count");
        assert_eq!(caps["ty"].trim(), "number");
        let caps = re.captures("for (const x of xs) {").unwrap();
        assert_eq!(&caps["name"], "x");
        assert!(re.captures("constant = 1;").is_none());
    }

    #[test]
    fn access_modifiers_normalize_whitespace() {
        assert!(CSHARP.accepts_access("protected   internal"));
        assert!(!CSHARP.accepts_access("friend"));
        assert!(TYPESCRIPT.accepts_access("public"));
        assert!(!TYPESCRIPT.accepts_access("internal"));
    }
}
