// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sealed PIN file. Absence means no PIN is configured.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::envelope::{self, SymmetricKey};
use crate::error::VaultError;
use crate::fsio;

#[derive(Debug, Clone)]
pub struct PinStore {
    path: PathBuf,
}

impl PinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> Result<bool, VaultError> {
        self.path
            .try_exists()
            .map_err(|e| VaultError::storage(&self.path, e))
    }

    /// Decrypt the stored PIN, or `None` if no PIN file exists.
    pub fn load(&self, key: &SymmetricKey) -> Result<Option<Zeroizing<String>>, VaultError> {
        match fsio::read_optional(&self.path)? {
            None => Ok(None),
            Some(bytes) => {
                let pin: String = envelope::open(&bytes, key)?;
                Ok(Some(Zeroizing::new(pin)))
            }
        }
    }

    pub fn store(&self, pin: &str, key: &SymmetricKey) -> Result<(), VaultError> {
        let sealed = envelope::seal(pin, key)?;
        fsio::atomic_write(&self.path, &sealed, false)
    }

    /// Delete the PIN file, reporting whether one existed.
    pub fn remove(&self) -> Result<bool, VaultError> {
        fsio::remove_if_exists(&self.path)
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
