// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sealed record store.
//!
//! The whole site-to-record mapping is one envelope: there is no per-record
//! encryption. A missing or zero-length vault file is the empty initial
//! state, not an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::{self, SymmetricKey};
use crate::error::VaultError;
use crate::fsio;

/// One stored credential. `site` is the canonical display form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct CredentialRecord {
    pub site: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted mapping from canonical site key to record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Records(BTreeMap<String, CredentialRecord>);

impl Records {
    /// Insert or replace the record under `key`.
    pub fn upsert(&mut self, key: impl Into<String>, record: CredentialRecord) {
        self.0.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Option<&CredentialRecord> {
        self.0.get(key)
    }

    /// Remove the record under `key`, reporting whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// The vault file.
#[derive(Debug, Clone)]
pub struct Vault {
    path: PathBuf,
}

impl Vault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file holds any ciphertext.
    pub fn has_data(&self) -> Result<bool, VaultError> {
        Ok(fsio::read_optional(&self.path)?.is_some_and(|bytes| !bytes.is_empty()))
    }

    /// Decrypt the mapping.
    pub fn load(&self, key: &SymmetricKey) -> Result<Records, VaultError> {
        match fsio::read_optional(&self.path)? {
            None => {
                debug!(path = %self.path.display(), "vault file absent, starting empty");
                Ok(Records::default())
            }
            Some(bytes) if bytes.is_empty() => {
                debug!(path = %self.path.display(), "vault file empty, starting empty");
                Ok(Records::default())
            }
            Some(bytes) => envelope::open(&bytes, key),
        }
    }

    /// Seal the mapping under `key` and atomically replace the file.
    pub fn store(&self, records: &Records, key: &SymmetricKey) -> Result<(), VaultError> {
        let sealed = envelope::seal(records, key)?;
        fsio::atomic_write(&self.path, &sealed, false)?;
        debug!(records = records.len(), "vault sealed");
        Ok(())
    }
}
