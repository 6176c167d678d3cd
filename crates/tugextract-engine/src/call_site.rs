// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Call-site generation.
//!
//! The call replaces the selected lines. Its shape follows the return set:
//!
//! | returns | declare                  | assign             |
//! |---------|--------------------------|--------------------|
//! | none    | `m(args);`               | `m(args);`         |
//! | one     | `var x = m(args);`       | `x = m(args);`     |
//! | many    | `var (a, b) = m(args);`  | `(a, b) = m(args);`|
//!
//! TypeScript uses `const`/`let`, brackets for tuples, and a `this.` or
//! `Type.` receiver on class members. Arguments are always the parameter
//! names in signature order.

use crate::error::{ExtractMethodError, ExtractMethodResult};
use crate::patterns::{AnnotationStyle, LanguageSpec, TupleStyle};
use crate::signature::signature_type;
use crate::types::{ReturnKind, VariableHandlingMapping, VariableInfo, VariableRole};

/// Receiver prefix for calling the new method from the selection's position.
pub fn receiver(
    spec: &LanguageSpec,
    type_name: Option<&str>,
    is_static: bool,
    free_function: bool,
) -> String {
    if spec.implicit_member_access || free_function {
        return String::new();
    }
    match (is_static, type_name) {
        (true, Some(name)) => format!("{}.", name),
        (true, None) => String::new(),
        (false, _) => "this.".to_string(),
    }
}

/// Keyword that declares the returned locals at the call site.
fn declaration_keyword(spec: &LanguageSpec, returns: &[VariableInfo]) -> &'static str {
    let reassignable = returns
        .iter()
        .any(|v| matches!(v.declaration_keyword.as_deref(), Some("let" | "var")));
    if spec.annotation == AnnotationStyle::Suffix && reassignable {
        "let"
    } else {
        spec.call_site_declaration
    }
}

fn tuple(names: &[&str], spec: &LanguageSpec) -> String {
    match spec.tuple {
        TupleStyle::Parenthesized => format!("({})", names.join(", ")),
        TupleStyle::Bracketed => format!("[{}]", names.join(", ")),
    }
}

/// Uninitialized declaration, used ahead of a mixed-return assignment.
fn forward_declaration(var: &VariableInfo, spec: &LanguageSpec) -> String {
    let ty = signature_type(var.inferred_type.as_deref(), spec);
    match spec.annotation {
        AnnotationStyle::Prefix => format!("{} {};", ty, var.name),
        AnnotationStyle::Suffix => format!("let {}: {};", var.name, ty),
    }
}

/// Lines replacing the selection.
///
/// A mixed return set (new locals together with reassigned variables) is
/// bound by assignment; the new locals get a declaration line first.
pub fn generate_call_site(
    method_name: &str,
    receiver: &str,
    mapping: &VariableHandlingMapping,
    indent: &str,
    spec: &LanguageSpec,
) -> ExtractMethodResult<Vec<String>> {
    if method_name.is_empty() {
        return Err(ExtractMethodError::EmptyFragment {
            fragment: "call site".to_string(),
        });
    }
    let call = format!(
        "{}{}({})",
        receiver,
        method_name,
        mapping.parameter_names().join(", ")
    );
    let returns = &mapping.variables_to_return;
    let names = mapping.return_names();
    let all_declared = returns.iter().all(|v| v.role == VariableRole::LocalDeclaration);

    let mut lines = Vec::new();
    let statement = match names.as_slice() {
        [] => format!("{};", call),
        [single] if mapping.return_kind == ReturnKind::Declare && all_declared => {
            format!("{} {} = {};", declaration_keyword(spec, returns), single, call)
        }
        [single] => format!("{} = {};", single, call),
        many if mapping.return_kind == ReturnKind::Declare && all_declared => format!(
            "{} {} = {};",
            declaration_keyword(spec, returns),
            tuple(many, spec),
            call
        ),
        many => {
            for var in returns.iter().filter(|v| v.role == VariableRole::LocalDeclaration) {
                lines.push(format!("{}{}", indent, forward_declaration(var, spec)));
            }
            format!("{} = {};", tuple(many, spec), call)
        }
    };
    lines.push(format!("{}{}", indent, statement));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{CSHARP, TYPESCRIPT};

    fn var(name: &str, ty: &str, role: VariableRole) -> VariableInfo {
        VariableInfo::new(name, Some(ty.to_string()), role)
    }

    fn declared(name: &str, ty: &str, kw: Option<&str>) -> VariableInfo {
        let mut v = var(name, ty, VariableRole::LocalDeclaration);
        v.declaration_keyword = kw.map(String::from);
        v
    }

    fn mapping(
        params: &[&str],
        returns: Vec<VariableInfo>,
        kind: ReturnKind,
    ) -> VariableHandlingMapping {
        VariableHandlingMapping {
            parameters_to_pass: params
                .iter()
                .map(|p| var(p, "int", VariableRole::Parameter))
                .collect(),
            variables_to_return: returns,
            return_kind: kind,
            ..Default::default()
        }
    }

    fn call(m: &VariableHandlingMapping, spec: &LanguageSpec, recv: &str) -> Vec<String> {
        generate_call_site("NewMethod", recv, m, "        ", spec).unwrap()
    }

    mod csharp {
        use super::*;

        #[test]
        fn void_call() {
            let m = mapping(&["a", "b"], vec![], ReturnKind::None);
            assert_eq!(call(&m, &CSHARP, ""), vec!["        NewMethod(a, b);"]);
        }

        #[test]
        fn single_declare_and_assign() {
            let m = mapping(&["y"], vec![declared("x", "int", Some("var"))], ReturnKind::Declare);
            assert_eq!(call(&m, &CSHARP, ""), vec!["        var x = NewMethod(y);"]);
            let m = mapping(
                &["total"],
                vec![var("total", "int", VariableRole::ExternalMutation)],
                ReturnKind::Assign,
            );
            assert_eq!(call(&m, &CSHARP, ""), vec!["        total = NewMethod(total);"]);
        }

        #[test]
        fn tuples() {
            let m = mapping(
                &[],
                vec![declared("a", "int", None), declared("b", "string", None)],
                ReturnKind::Declare,
            );
            assert_eq!(call(&m, &CSHARP, ""), vec!["        var (a, b) = NewMethod();"]);
            let m = mapping(
                &["a"],
                vec![
                    var("a", "int", VariableRole::ExternalMutation),
                    var("b", "int", VariableRole::ExternalMutation),
                ],
                ReturnKind::Assign,
            );
            assert_eq!(call(&m, &CSHARP, ""), vec!["        (a, b) = NewMethod(a);"]);
        }

        #[test]
        fn mixed_declares_first() {
            let m = mapping(
                &["total"],
                vec![
                    declared("extra", "int", Some("var")),
                    var("total", "int", VariableRole::ExternalMutation),
                ],
                ReturnKind::Assign,
            );
            assert_eq!(
                call(&m, &CSHARP, ""),
                vec!["        int extra;", "        (extra, total) = NewMethod(total);"]
            );
        }
    }

    mod typescript {
        use super::*;

        #[test]
        fn receivers() {
            assert_eq!(receiver(&TYPESCRIPT, Some("Cart"), false, false), "this.");
            assert_eq!(receiver(&TYPESCRIPT, Some("Cart"), true, false), "Cart.");
            assert_eq!(receiver(&TYPESCRIPT, None, false, true), "");
            assert_eq!(receiver(&CSHARP, Some("Order"), false, false), "");
        }

        #[test]
        fn const_unless_reassignable() {
            let taxed = declared("taxed", "number", Some("const"));
            let m = mapping(&["sum"], vec![taxed], ReturnKind::Declare);
            assert_eq!(
                call(&m, &TYPESCRIPT, "this."),
                vec!["        const taxed = this.NewMethod(sum);"]
            );
            let m = mapping(
                &[],
                vec![declared("a", "number", Some("let")), declared("b", "number", Some("const"))],
                ReturnKind::Declare,
            );
            assert_eq!(call(&m, &TYPESCRIPT, ""), vec!["        let [a, b] = NewMethod();"]);
        }

        #[test]
        fn bracketed_assignment() {
            let m = mapping(
                &["a", "b"],
                vec![
                    var("a", "number", VariableRole::ExternalMutation),
                    var("b", "number", VariableRole::ExternalMutation),
                ],
                ReturnKind::Assign,
            );
            assert_eq!(
                call(&m, &TYPESCRIPT, "this."),
                vec!["        [a, b] = this.NewMethod(a, b);"]
            );
        }
    }

    #[test]
    fn empty_name_rejected() {
        let m = mapping(&[], vec![], ReturnKind::None);
        assert!(generate_call_site("", "", &m, "", &CSHARP).is_err());
    }
}
