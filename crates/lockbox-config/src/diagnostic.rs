// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics.
//!
//! Unknown keys get a "did you mean" suggestion ranked by Jaro-Winkler
//! similarity and, when the offending file is known, a labelled span at the
//! key itself.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem found while loading or validating.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config section defines.
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(lockbox::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// `[storage]`, `[keys]`, ... or "the top level".
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the field's type.
    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(lockbox::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `keys.rsa_bits`.
        key: String,
        detail: String,
        expected: String,
    },

    /// A well-typed value that breaks a semantic rule.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(lockbox::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(lockbox::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error carried by `err` into a diagnostic.
///
/// `sources` pairs file paths with their contents so unknown keys can be
/// pointed at.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = locate(error, field, sources).unzip();
            ConfigError::UnknownKey {
                key: field.clone(),
                section: section_name(&error.path),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
            ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}"),
                expected: expected.clone(),
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

fn section_name(path: &[String]) -> String {
    if path.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{}]", path.join("."))
    }
}

fn locate(
    error: &figment::Error,
    field: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let Some(figment::Source::File(path)) = error.metadata.as_ref().and_then(|m| m.source.as_ref())
    else {
        return None;
    };
    let path = path.display().to_string();
    let (name, content) = sources.iter().find(|(p, _)| *p == path)?;
    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `key` inside the `[section]` table of a TOML document.
///
/// An empty `section` means keys before the first table header.
pub fn find_key_offset(content: &str, section: &[String], key: &str) -> Option<usize> {
    let wanted = section.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().unwrap_or_default().trim().to_string();
        } else if current == wanted
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }

    None
}

/// The valid key most similar to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each diagnostic to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
    if errors.len() > 1 {
        eprintln!("{} configuration errors", errors.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        assert_eq!(
            suggest_key("rsa_bit", &["rsa_bits"]),
            Some("rsa_bits".to_string())
        );
    }

    #[test]
    fn suggests_best_of_several() {
        let valid = &["data_dir", "vault_file", "pin_file"];
        assert_eq!(
            suggest_key("valt_file", valid),
            Some("vault_file".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_unrelated_key() {
        assert_eq!(suggest_key("zzzzzz", &["level"]), None);
    }

    #[test]
    fn key_offset_inside_section() {
        let content = "[keys]\nrsa_bit = 2048\n";
        let offset = find_key_offset(content, &["keys".to_string()], "rsa_bit").unwrap();
        assert_eq!(offset, 7);
        assert_eq!(&content[offset..offset + 7], "rsa_bit");
    }

    #[test]
    fn key_offset_skips_other_sections() {
        let content = "[generator]\nlevel = 1\n\n[logging]\n  level = \"info\"\n";
        let offset = find_key_offset(content, &["logging".to_string()], "level").unwrap();
        assert_eq!(&content[offset..offset + 5], "level");
        assert!(offset > content.find("[logging]").unwrap());
    }

    #[test]
    fn key_offset_ignores_longer_keys() {
        let content = "[keys]\nrsa_bits = 2048\n";
        assert!(find_key_offset(content, &["keys".to_string()], "rsa_bit").is_none());
    }

    #[test]
    fn key_offset_missing_section() {
        let content = "[storage]\ndata_dir = \"x\"\n";
        assert!(find_key_offset(content, &["keys".to_string()], "rsa_bits").is_none());
    }

    #[test]
    fn section_names() {
        assert_eq!(section_name(&[]), "the top level");
        assert_eq!(section_name(&["storage".to_string()]), "[storage]");
    }
}
