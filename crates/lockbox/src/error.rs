// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command errors and their exit codes.

use lockbox_config::ConfigError;
use lockbox_vault::VaultError;
use thiserror::Error;

/// Exit code for success.
pub const EXIT_OK: u8 = 0;
/// Exit code for errors the user can correct and retry.
pub const EXIT_RECOVERABLE: u8 = 1;
/// Exit code for errors that leave the store untrusted or unusable.
pub const EXIT_FATAL: u8 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("incorrect PIN")]
    IncorrectPin,

    /// Reading a secret from the terminal failed or was impossible.
    #[error("{0}")]
    Prompt(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Vault(err) if err.is_fatal() => EXIT_FATAL,
            Self::Config(_) => EXIT_FATAL,
            _ => EXIT_RECOVERABLE,
        }
    }
}
