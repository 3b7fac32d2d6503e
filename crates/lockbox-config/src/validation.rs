// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as bare file names, distinct artifact names, and key size limits.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::LockboxConfig;

/// Smallest RSA modulus accepted for new key pairs.
pub const MIN_RSA_BITS: usize = 1024;

/// Largest RSA modulus accepted for new key pairs.
pub const MAX_RSA_BITS: usize = 16384;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LockboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    let files = [
        ("public_key_file", &config.storage.public_key_file),
        ("private_key_file", &config.storage.private_key_file),
        ("wrapped_key_file", &config.storage.wrapped_key_file),
        ("vault_file", &config.storage.vault_file),
        ("pin_file", &config.storage.pin_file),
    ];

    let mut seen = HashSet::new();
    for (key, name) in files {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("storage.{key} must not be empty"),
            });
            continue;
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            errors.push(ConfigError::Validation {
                message: format!("storage.{key} `{name}` must be a file name, not a path"),
            });
        }
        if !seen.insert(name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("storage.{key} `{name}` is already used by another artifact"),
            });
        }
    }

    let bits = config.keys.rsa_bits;
    if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&bits) || bits % 8 != 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "keys.rsa_bits must be a multiple of 8 between {MIN_RSA_BITS} and {MAX_RSA_BITS}, got {bits}"
            ),
        });
    }

    if config.generator.default_length < 1 {
        errors.push(ConfigError::Validation {
            message: "generator.default_length must be at least 1".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LockboxConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_data_dir_fails_validation() {
        let mut config = LockboxConfig::default();
        config.storage.data_dir = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "data_dir"));
    }

    #[test]
    fn duplicate_file_names_fail_validation() {
        let mut config = LockboxConfig::default();
        config.storage.pin_file = config.storage.vault_file.clone();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "already used"));
    }

    #[test]
    fn file_name_with_separator_fails_validation() {
        let mut config = LockboxConfig::default();
        config.storage.vault_file = "../vault.bin".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "storage.vault_file"));
    }

    #[test]
    fn small_rsa_modulus_fails_validation() {
        let mut config = LockboxConfig::default();
        config.keys.rsa_bits = 512;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "keys.rsa_bits"));
    }

    #[test]
    fn unaligned_rsa_modulus_fails_validation() {
        let mut config = LockboxConfig::default();
        config.keys.rsa_bits = 2050;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_default_length_fails_validation() {
        let mut config = LockboxConfig::default();
        config.generator.default_length = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "default_length"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LockboxConfig::default();
        config.logging.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = LockboxConfig::default();
        config.storage.data_dir = String::new();
        config.keys.rsa_bits = 0;
        config.generator.default_length = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
