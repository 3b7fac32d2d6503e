// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lockbox secret store.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Lockbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    /// Location of the key files, the vault file and the PIN file.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Asymmetric key generation settings.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Password generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// On-disk layout of the persisted artifacts.
///
/// Every artifact lives directly inside `data_dir`; the `*_file` values are
/// bare file names, not paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding all artifacts.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Public key (SPKI PEM).
    #[serde(default = "default_public_key_file")]
    pub public_key_file: String,

    /// Private key (PKCS#8 PEM).
    #[serde(default = "default_private_key_file")]
    pub private_key_file: String,

    /// Symmetric key wrapped under the public key.
    #[serde(default = "default_wrapped_key_file")]
    pub wrapped_key_file: String,

    /// Encrypted site -> credential mapping.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Encrypted PIN. Absence means no PIN is configured.
    #[serde(default = "default_pin_file")]
    pub pin_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            public_key_file: default_public_key_file(),
            private_key_file: default_private_key_file(),
            wrapped_key_file: default_wrapped_key_file(),
            vault_file: default_vault_file(),
            pin_file: default_pin_file(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("lockbox"))
        .unwrap_or_else(|| std::path::PathBuf::from("lockbox-data"))
        .to_string_lossy()
        .into_owned()
}

fn default_public_key_file() -> String {
    "public.pem".to_string()
}

fn default_private_key_file() -> String {
    "private.pem".to_string()
}

fn default_wrapped_key_file() -> String {
    "symmetric.key".to_string()
}

fn default_vault_file() -> String {
    "vault.bin".to_string()
}

fn default_pin_file() -> String {
    "pin.bin".to_string()
}

/// Asymmetric key pair settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    /// RSA modulus size in bits for newly generated key pairs (default: 1024).
    ///
    /// Only affects key pairs created by `initialize` or a rotation; an
    /// existing key pair keeps its size until rotated.
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            rsa_bits: default_rsa_bits(),
        }
    }
}

fn default_rsa_bits() -> usize {
    1024
}

/// Password generator defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Length used when the caller does not ask for one.
    #[serde(default = "default_password_length")]
    pub default_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_length: default_password_length(),
        }
    }
}

fn default_password_length() -> usize {
    12
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_names_are_distinct() {
        let storage = StorageConfig::default();
        let mut names = vec![
            storage.public_key_file,
            storage.private_key_file,
            storage.wrapped_key_file,
            storage.vault_file,
            storage.pin_file,
        ];
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn default_data_dir_ends_with_lockbox() {
        let storage = StorageConfig::default();
        assert!(storage.data_dir.contains("lockbox"));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = LockboxConfig::default();
        assert_eq!(config.keys.rsa_bits, 1024);
        assert_eq!(config.generator.default_length, 12);
        assert_eq!(config.logging.level, "info");
    }
}
