// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Supported source languages.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::patterns::{LanguageSpec, CSHARP, TYPESCRIPT};

/// A language the engine has scanning tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    CSharp,
    TypeScript,
}

impl SourceLanguage {
    /// Every supported language.
    pub const ALL: [SourceLanguage; 2] = [SourceLanguage::CSharp, SourceLanguage::TypeScript];

    /// Parse a language name or common alias (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Some(SourceLanguage::CSharp),
            "typescript" | "ts" | "tsx" | "javascript" | "js" | "jsx" => {
                Some(SourceLanguage::TypeScript)
            }
            _ => None,
        }
    }

    /// Infer the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "cs" => Some(SourceLanguage::CSharp),
            "ts" | "tsx" | "mts" | "cts" | "js" | "jsx" | "mjs" | "cjs" => {
                Some(SourceLanguage::TypeScript)
            }
            _ => None,
        }
    }

    /// Canonical name, as accepted by [`SourceLanguage::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "csharp",
            SourceLanguage::TypeScript => "typescript",
        }
    }

    /// Scanning tables for this language.
    pub fn spec(&self) -> &'static LanguageSpec {
        match self {
            SourceLanguage::CSharp => &CSHARP,
            SourceLanguage::TypeScript => &TYPESCRIPT,
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
