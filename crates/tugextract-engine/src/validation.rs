// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Name and modifier validation for the generated method.

use thiserror::Error;

use crate::language::SourceLanguage;

/// Error for validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid method identifier.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn invalid(name: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn is_ident_start(ch: char, language: SourceLanguage) -> bool {
    ch.is_alphabetic() || ch == '_' || (language == SourceLanguage::TypeScript && ch == '$')
}

fn is_ident_continue(ch: char, language: SourceLanguage) -> bool {
    ch.is_alphanumeric() || ch == '_' || (language == SourceLanguage::TypeScript && ch == '$')
}

/// Validate that `name` can be used as the new method's identifier.
///
/// Checks:
/// - Non-empty
/// - Starts with a letter or underscore (`$` is also allowed in TypeScript)
/// - Contains only identifier characters
/// - Not a reserved word of the language
pub fn validate_method_name(name: &str, language: SourceLanguage) -> ValidationResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid(name, "name cannot be empty"));
    };
    if !is_ident_start(first, language) {
        return Err(invalid(name, "must start with letter or underscore"));
    }
    if let Some(ch) = chars.find(|&ch| !is_ident_continue(ch, language)) {
        return Err(invalid(name, format!("invalid character: '{}'", ch)));
    }
    if language.spec().is_keyword(name) {
        return Err(invalid(
            name,
            format!("cannot use {} keyword as identifier", language),
        ));
    }
    Ok(())
}

/// Whether `modifier` is an access modifier the language accepts.
///
/// The empty string is accepted and means "use the default".
pub fn is_valid_access_modifier(modifier: &str, language: SourceLanguage) -> bool {
    modifier.trim().is_empty() || language.spec().accepts_access(modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod method_names {
        use super::*;

        #[test]
        fn simple_names() {
            assert!(validate_method_name("ComputeTotal", SourceLanguage::CSharp).is_ok());
            assert!(validate_method_name("_helper", SourceLanguage::CSharp).is_ok());
            assert!(validate_method_name("computeTotal", SourceLanguage::TypeScript).is_ok());
        }

        #[test]
        fn dollar_only_in_typescript() {
            assert!(validate_method_name("$load", SourceLanguage::TypeScript).is_ok());
            assert!(validate_method_name("$load", SourceLanguage::CSharp).is_err());
        }

        #[test]
        fn rejects_bad_shapes() {
            for name in ["", "1st", "has space", "dash-name"] {
                assert!(
                    validate_method_name(name, SourceLanguage::CSharp).is_err(),
                    "{name:?} should be rejected"
                );
            }
        }

        #[test]
        fn rejects_keywords() {
            let err = validate_method_name("class", SourceLanguage::CSharp).unwrap_err();
            assert!(err.to_string().contains("keyword"));
            assert!(validate_method_name("function", SourceLanguage::TypeScript).is_err());
            assert!(validate_method_name("function", SourceLanguage::CSharp).is_ok());
        }
    }

    mod access_modifiers {
        use super::*;

        #[test]
        fn empty_means_default() {
            assert!(is_valid_access_modifier("", SourceLanguage::CSharp));
            assert!(is_valid_access_modifier("  ", SourceLanguage::TypeScript));
        }

        #[test]
        fn per_language_sets() {
            assert!(is_valid_access_modifier("private protected", SourceLanguage::CSharp));
            assert!(is_valid_access_modifier("internal", SourceLanguage::CSharp));
            assert!(!is_valid_access_modifier("internal", SourceLanguage::TypeScript));
            assert!(!is_valid_access_modifier("friend", SourceLanguage::CSharp));
        }
    }
}
