// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the vault.
//!
//! Every public operation in this crate returns [`VaultError`]. Callers
//! branch on [`VaultError::kind`] or [`VaultError::is_fatal`]: recoverable
//! kinds are reported to the user as normal results, fatal kinds mean the
//! on-disk state cannot be trusted and must never be "repaired" automatically.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the Lockbox vault.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The password policy leaves no usable characters, or the length is zero.
    #[error("invalid password policy: {0}")]
    InvalidPolicy(String),

    /// Caller-supplied input was rejected (empty site name, empty PIN).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No credentials are stored under the canonical key of `site`.
    #[error("no credentials stored for `{site}`")]
    NotFound { site: String },

    /// Authenticated decryption failed: wrong key, tampering, or truncation.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Key artifacts are missing, partial, or unreadable.
    #[error("key store corrupt: {0}")]
    KeyStoreCorrupt(String),

    /// Key rotation replaced key material but did not finish re-encrypting.
    #[error("key rotation incomplete: {0}; restore the key files, vault and PIN from backup")]
    RotationIncomplete(String),

    /// An artifact could not be read or written.
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Random number generation or key generation failed.
    #[error("internal vault error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPolicy,
    InvalidInput,
    NotFound,
    DecryptionFailed,
    KeyStoreCorrupt,
    RotationIncomplete,
    Storage,
    Internal,
}

impl VaultError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPolicy(_) => ErrorKind::InvalidPolicy,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
            Self::KeyStoreCorrupt(_) => ErrorKind::KeyStoreCorrupt,
            Self::RotationIncomplete(_) => ErrorKind::RotationIncomplete,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the vault state can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::InvalidPolicy | ErrorKind::InvalidInput | ErrorKind::NotFound
        )
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Re-labels a fatal error raised after key material was replaced.
    pub(crate) fn into_rotation_incomplete(self, stage: &str) -> Self {
        match self {
            Self::RotationIncomplete(_) => self,
            other => Self::RotationIncomplete(format!("{stage}: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds_are_not_fatal() {
        assert!(!VaultError::InvalidPolicy("empty".into()).is_fatal());
        assert!(!VaultError::InvalidInput("empty".into()).is_fatal());
        assert!(!VaultError::NotFound { site: "x".into() }.is_fatal());
    }

    #[test]
    fn integrity_kinds_are_fatal() {
        assert!(VaultError::DecryptionFailed("tag".into()).is_fatal());
        assert!(VaultError::KeyStoreCorrupt("partial".into()).is_fatal());
        assert!(VaultError::RotationIncomplete("vault".into()).is_fatal());
        let io = std::io::Error::other("disk full");
        assert!(VaultError::storage("/tmp/vault.bin", io).is_fatal());
    }

    #[test]
    fn rotation_relabel_keeps_cause() {
        let err = VaultError::DecryptionFailed("bad tag".into())
            .into_rotation_incomplete("re-encrypting vault");
        assert_eq!(err.kind(), ErrorKind::RotationIncomplete);
        assert!(err.to_string().contains("re-encrypting vault"));
        assert!(err.to_string().contains("bad tag"));
    }

    #[test]
    fn not_found_message_names_site() {
        let err = VaultError::NotFound {
            site: "example.com".into(),
        };
        assert_eq!(err.to_string(), "no credentials stored for `example.com`");
    }
}
