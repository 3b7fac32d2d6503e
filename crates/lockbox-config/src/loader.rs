// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lockbox.toml` > `~/.config/lockbox/lockbox.toml` > `/etc/lockbox/lockbox.toml`
//! with environment variable overrides via `LOCKBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LockboxConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/lockbox/lockbox.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lockbox.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lockbox/lockbox.toml` (system-wide)
/// 3. `~/.config/lockbox/lockbox.toml` (user XDG config)
/// 4. `./lockbox.toml` (local directory)
/// 5. `LOCKBOX_*` environment variables
pub fn load_config() -> Result<LockboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Path of the per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("lockbox").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LOCKBOX_STORAGE_DATA_DIR` must map to `storage.data_dir`,
/// not `storage.data.dir`. Figment hands `map()` the key in its original
/// case, so it is lowercased first.
fn env_provider() -> Env {
    Env::prefixed("LOCKBOX_")
        // LOCKBOX_PIN feeds the PIN prompt, it is not a config key.
        .ignore(&["pin"])
        .map(|key| {
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("storage_", "storage.", 1)
                .replacen("keys_", "keys.", 1)
                .replacen("generator_", "generator.", 1)
                .replacen("logging_", "logging.", 1);
            mapped.into()
        })
}
