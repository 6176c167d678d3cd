// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Properties every successful extraction must hold.
//!
//! - The line edits, applied to the original text, reproduce `modifiedText`.
//! - Arguments at the call site follow the signature's parameter order.
//! - The returned variables are exactly the names bound at the call site.
//! - The new method is a member of the selection's type.
//! - Inlining the planned body back over the call site restores the
//!   original text, up to whitespace.
//! - The return type has one component per returned variable, in the order
//!   the call site binds them.
//! - Scanning is deterministic.
//! - Rejected requests carry no text and no edits.

use tugextract_engine::scope::LanguageScopeAdapter;
use tugextract_engine::{
    EngineOptions, ExtractMethodEngine, ExtractMethodOutput, ExtractionRequest, RefactoringResult,
    SourceLanguage,
};

struct Case {
    text: &'static str,
    language: &'static str,
    start: usize,
    end: usize,
    name: &'static str,
}

const INVENTORY: &str = "\
using System;

namespace Shop
{
    public class Inventory
    {
        private int _count;

        public string Describe(string label, int quantity)
        {
            var total = quantity * 2;
            var name = label.Trim();
            _count += total;
            if (total > 10)
            {
                name = name + \"!\";
            }
            Console.WriteLine(name);
            return name + total;
        }

        public void Reset()
        {
            _count = 0;
        }
    }
}
";

const CART: &str = "\
export class Cart {
    private items: number[] = [];

    checkout(discount: number, label: string): string {
        let subtotal = 0;
        for (const item of this.items) {
            subtotal += item;
        }
        const net = subtotal - discount;
        const message = `${label}: ${net}`;
        console.log(message);
        return message;
    }
}
";

const CASES: &[Case] = &[
    Case { text: INVENTORY, language: "csharp", start: 11, end: 12, name: "Prepare" },
    Case { text: INVENTORY, language: "csharp", start: 14, end: 17, name: "Decorate" },
    Case { text: INVENTORY, language: "csharp", start: 13, end: 18, name: "Finish" },
    Case { text: INVENTORY, language: "csharp", start: 24, end: 24, name: "ClearCount" },
    Case { text: CART, language: "typescript", start: 6, end: 8, name: "sumItems" },
    Case { text: CART, language: "typescript", start: 9, end: 10, name: "buildMessage" },
    Case { text: CART, language: "typescript", start: 11, end: 11, name: "log" },
];

fn run(case: &Case) -> RefactoringResult {
    let mut engine = ExtractMethodEngine::new(EngineOptions::default());
    let result = engine.extract(
        case.text,
        &ExtractionRequest::new(case.start, case.end, case.name, case.language),
    );
    assert!(
        result.success,
        "{} {}-{} failed: {}",
        case.name, case.start, case.end, result.message
    );
    result
}

/// Names in a parameter list, for either annotation style.
fn parameter_names(signature: &str, name: &str) -> Vec<String> {
    let open = signature.find(&format!("{}(", name)).unwrap() + name.len();
    let close = signature.rfind(')').unwrap();
    let inner = &signature[open + 1..close];
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner
        .split(", ")
        .map(|p| match p.split_once(':') {
            Some((name, _)) => name.trim().to_string(),
            None => p.rsplit(' ').next().unwrap().to_string(),
        })
        .collect()
}

/// Arguments of the call in a call-site line.
fn call_arguments(call_site: &str, name: &str) -> Vec<String> {
    let at = call_site.find(&format!("{}(", name)).unwrap() + name.len() + 1;
    let close = call_site[at..].find(')').unwrap() + at;
    let inner = &call_site[at..close];
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(", ").map(String::from).collect()
}

/// Text with every whitespace character removed.
fn squeeze(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Split `text` at commas outside brackets.
fn top_level_components(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' | '[' | '<' | '{' => depth += 1,
            ')' | ']' | '>' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    parts.push(current.trim().to_string());
    parts
}

#[test]
fn edits_reproduce_modified_text() {
    for case in CASES {
        let result = run(case);
        let expected = result.modified_text.clone().unwrap();
        let output = ExtractMethodOutput::new("input", case.text, result);
        let applied = output.patch.apply_to("input", case.text);
        assert_eq!(applied.as_deref(), Some(expected.as_str()), "{}", case.name);
    }
}

#[test]
fn arguments_follow_parameter_order() {
    for case in CASES {
        let result = run(case);
        let plan = result.plan.as_ref().unwrap();
        let params = parameter_names(&plan.signature_text, case.name);
        let args = call_arguments(&plan.call_site_text, case.name);
        assert_eq!(params, args, "{}", case.name);
        let mapping = result.mapping.as_ref().unwrap();
        assert_eq!(mapping.parameter_names(), params, "{}", case.name);
    }
}

#[test]
fn returned_names_bound_at_call_site() {
    for case in CASES {
        let result = run(case);
        let mapping = result.mapping.as_ref().unwrap();
        let plan = result.plan.as_ref().unwrap();
        let call_line = plan.call_site_text.lines().last().unwrap();
        let binding = call_line
            .split_once(" = ")
            .map(|(lhs, _)| lhs.trim().to_string())
            .unwrap_or_default();
        for name in mapping.return_names() {
            assert!(binding.contains(name), "{}: {} not bound in {}", case.name, name, call_line);
        }
        if mapping.returns_nothing() {
            assert!(binding.is_empty(), "{}: {}", case.name, call_line);
            assert_eq!(mapping.suggested_return_type, "void");
        }
    }
}

#[test]
fn method_lands_inside_enclosing_type() {
    for case in CASES {
        let result = run(case);
        let language = SourceLanguage::from_name(case.language).unwrap();
        let adapter = LanguageScopeAdapter::new(language).unwrap();
        let lines: Vec<String> = result
            .modified_text
            .as_deref()
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        let scan = adapter.scan(&lines);
        assert!(scan.balanced, "{}", case.name);
        let header = result.metadata["insertionLine"].as_u64().unwrap() as usize;
        let member = scan.enclosing_member(header).unwrap();
        assert_eq!(member.name, case.name);
        let ty = scan.enclosing_type(header).unwrap();
        assert_eq!(Some(ty.name.as_str()), result.metadata["enclosingType"].as_str());
        assert_eq!(result.metadata["insertionStrategy"], "enclosing_type");
    }
}

#[test]
fn inlining_body_restores_original() {
    for case in CASES {
        let result = run(case);
        let plan = result.plan.as_ref().unwrap();
        let mapping = result.mapping.as_ref().unwrap();
        let mut lines: Vec<String> = result
            .modified_text
            .as_deref()
            .unwrap()
            .lines()
            .map(String::from)
            .collect();

        // `method_text` starts with the blank separator.
        let header = result.metadata["insertionLine"].as_u64().unwrap() as usize;
        let method_len = plan.method_text.lines().count();
        assert!(lines[header - 2].trim().is_empty(), "{}", case.name);
        assert!(lines[header - 1].trim_start().starts_with(&plan.signature_text), "{}", case.name);
        lines.drain(header - 2..header - 2 + method_len);

        // The body without the locals it introduces and without its return.
        let mut body: Vec<&str> = plan.body_text.lines().collect();
        body.drain(..mapping.locals_to_introduce.len());
        if !mapping.returns_nothing() {
            let ret = body.pop().unwrap();
            assert!(ret.trim_start().starts_with("return"), "{}: {}", case.name, ret);
        }

        let call_len = plan.call_site_text.lines().count();
        let call_at = case.start - 1;
        let call = lines[call_at..call_at + call_len].join("\n");
        assert_eq!(call, plan.call_site_text, "{}", case.name);
        lines.splice(call_at..call_at + call_len, body.into_iter().map(String::from));

        assert_eq!(squeeze(&lines.join("\n")), squeeze(case.text), "{}", case.name);
    }
}

#[test]
fn return_shape_matches_returned_variables() {
    for case in CASES {
        let result = run(case);
        let mapping = result.mapping.as_ref().unwrap();
        let plan = result.plan.as_ref().unwrap();
        let returned = &mapping.variables_to_return;
        let ty = mapping.suggested_return_type.as_str();
        match returned.as_slice() {
            [] => assert!(ty == "void", "{}: {}", case.name, ty),
            [single] => {
                if let Some(inferred) = &single.inferred_type {
                    assert_eq!(ty, inferred, "{}", case.name);
                }
                assert!(!ty.starts_with('(') && !ty.starts_with('['), "{}: {}", case.name, ty);
            }
            many => {
                let (open, close) = if case.language == "csharp" { ('(', ')') } else { ('[', ']') };
                assert!(ty.starts_with(open) && ty.ends_with(close), "{}: {}", case.name, ty);
                let components = top_level_components(&ty[1..ty.len() - 1]);
                assert_eq!(components.len(), many.len(), "{}: {}", case.name, ty);
                for (component, var) in components.iter().zip(many) {
                    if let Some(inferred) = &var.inferred_type {
                        assert_eq!(component, inferred, "{}: {}", case.name, var.name);
                    }
                }

                let call_line = plan.call_site_text.lines().last().unwrap();
                let (lhs, _) = call_line.split_once(" = ").unwrap();
                let inner = lhs.trim().rsplit_once(open).unwrap().1.trim_end_matches(close);
                let bound: Vec<&str> = inner.split(", ").collect();
                assert_eq!(bound, mapping.return_names(), "{}", case.name);
            }
        }
    }
}

#[test]
fn scanning_is_deterministic() {
    let documents = [(INVENTORY, SourceLanguage::CSharp), (CART, SourceLanguage::TypeScript)];
    for (text, language) in documents {
        let adapter = LanguageScopeAdapter::new(language).unwrap();
        let lines: Vec<String> = text.lines().map(String::from).collect();
        assert_eq!(adapter.scan(&lines), adapter.scan(&lines));
        for line in 1..=lines.len() {
            assert_eq!(
                adapter.enclosing_frames(&lines, line),
                adapter.enclosing_frames(&lines, line)
            );
        }
    }
}

#[test]
fn line_count_accounts_for_every_edit() {
    for case in CASES {
        let result = run(case);
        let before = case.text.lines().count() as isize;
        let after = result.modified_text.as_deref().unwrap().lines().count() as isize;
        let delta: isize = result
            .edits
            .iter()
            .map(|e| e.inserted.len() as isize - e.removed as isize)
            .sum();
        assert_eq!(after, before + delta, "{}", case.name);
    }
}

#[test]
fn rejected_requests_carry_nothing() {
    let mut engine = ExtractMethodEngine::new(EngineOptions::default());
    let requests = [
        ExtractionRequest::new(11, 80, "TooFar", "csharp"),
        ExtractionRequest::new(9, 12, "Header", "csharp"),
        ExtractionRequest::new(14, 16, "HalfBlock", "csharp"),
        ExtractionRequest::new(11, 12, "1bad", "csharp"),
        ExtractionRequest::new(11, 12, "Prepare", "python"),
    ];
    for request in &requests {
        let result = engine.extract(INVENTORY, request);
        assert!(!result.success, "{}", request.new_method_name);
        assert!(result.modified_text.is_none());
        assert!(result.edits.is_empty());
        assert!(result.plan.is_none());
        assert!(result.failure.is_some());
    }
}
