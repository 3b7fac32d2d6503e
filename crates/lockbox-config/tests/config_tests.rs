// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Lockbox configuration system.

use lockbox_config::diagnostic::ConfigError;
use lockbox_config::{load_and_validate_str, load_config_from_str, to_toml};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_lockbox_config() {
    let toml = r#"
[storage]
data_dir = "/tmp/lockbox-test"
public_key_file = "pub.pem"
private_key_file = "priv.pem"
wrapped_key_file = "wrapped.key"
vault_file = "passwords.bin"
pin_file = "pin.enc"

[keys]
rsa_bits = 2048

[generator]
default_length = 24

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.storage.data_dir, "/tmp/lockbox-test");
    assert_eq!(config.storage.public_key_file, "pub.pem");
    assert_eq!(config.storage.private_key_file, "priv.pem");
    assert_eq!(config.storage.wrapped_key_file, "wrapped.key");
    assert_eq!(config.storage.vault_file, "passwords.bin");
    assert_eq!(config.storage.pin_file, "pin.enc");
    assert_eq!(config.keys.rsa_bits, 2048);
    assert_eq!(config.generator.default_length, 24);
    assert_eq!(config.logging.level, "debug");
}

/// Unknown field in [keys] section produces an error.
#[test]
fn unknown_field_in_keys_produces_error() {
    let toml = r#"
[keys]
rsa_bit = 2048
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("rsa_bit"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field is surfaced as a diagnostic with a suggestion.
#[test]
fn unknown_field_diagnostic_suggests_correction() {
    let toml = r#"
[storage]
valt_file = "x.bin"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("vault_file"));
}

/// Wrong value type is reported as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[keys]
rsa_bits = "big"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string for integer");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("rsa_bits"))));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.storage.public_key_file, "public.pem");
    assert_eq!(config.storage.private_key_file, "private.pem");
    assert_eq!(config.storage.wrapped_key_file, "symmetric.key");
    assert_eq!(config.storage.vault_file, "vault.bin");
    assert_eq!(config.storage.pin_file, "pin.bin");
    assert_eq!(config.keys.rsa_bits, 1024);
    assert_eq!(config.generator.default_length, 12);
    assert_eq!(config.logging.level, "info");
}

/// Semantic validation runs after deserialization.
#[test]
fn validation_rejects_small_key_size() {
    let toml = r#"
[keys]
rsa_bits = 512
"#;

    let errors = load_and_validate_str(toml).expect_err("512-bit keys must be rejected");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("rsa_bits"))));
}

/// Rendering the effective configuration produces TOML that loads back.
#[test]
fn rendered_config_loads_back() {
    let config = load_config_from_str("[generator]\ndefault_length = 30\n").unwrap();
    let rendered = to_toml(&config).unwrap();
    assert!(rendered.contains("[storage]"));

    let reloaded = load_config_from_str(&rendered).unwrap();
    assert_eq!(reloaded.generator.default_length, 30);
    assert_eq!(reloaded.storage.data_dir, config.storage.data_dir);
}
