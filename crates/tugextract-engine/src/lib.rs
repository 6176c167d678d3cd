// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Extract-method refactoring engine for C# and TypeScript.
//!
//! The engine turns a contiguous range of lines inside a method body into a
//! new method and replaces the range with a call to it. It works on text with
//! lightweight lexical scanning rather than a full parser:
//!
//! - [`lexer`]: blanks comments and literal contents so braces and names can
//!   be scanned safely
//! - [`scope`]: the language scope adapter, producing [`scope::ScopeFrame`]s
//! - [`flow`]: classifies variables into parameters, locals and mutations
//! - [`typeinfer`]: declared, literal and name-based type inference
//! - [`signature`] and [`call_site`]: generate the new method and its call
//! - [`splice`]: finds the insertion point and assembles the final text
//! - [`ops::extract_method`]: the orchestrator tying the stages together
//!
//! Everything here is pure: no file I/O, no global state. Persisting results,
//! backups and undo live in the front doors.

pub mod call_site;
pub mod document;
pub mod error;
pub mod flow;
pub mod language;
pub mod lexer;
pub mod ops;
pub mod patterns;
pub mod scope;
pub mod signature;
pub mod splice;
pub mod typeinfer;
pub mod types;
pub mod validation;

pub use error::{ExtractMethodError, ExtractMethodResult};
pub use language::SourceLanguage;
pub use ops::extract_method::{EngineOptions, ExtractMethodEngine, ExtractMethodOutput};
pub use types::{
    Diagnostic, ExtractionPlan, ExtractionRequest, FailureKind, RefactoringResult, Severity,
    Stage, VariableHandlingMapping, VariableInfo, VariableRole,
};
