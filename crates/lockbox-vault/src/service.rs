// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault facade.
//!
//! Every operation that loads the record mapping re-seals and rewrites the
//! vault file before returning, reads included. A load that fails never
//! reaches the write.

use lockbox_config::LockboxConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::canonical::{canonicalize, SiteKey};
use crate::error::VaultError;
use crate::generator::{self, PasswordPolicy};
use crate::keys::{KeyManager, KeyStoreState};
use crate::layout::VaultLayout;
use crate::pin::{constant_time_eq, PinStore};
use crate::store::{CredentialRecord, Records, Vault};

/// Where the password for [`VaultService::reset`] comes from.
#[derive(Debug, Clone)]
pub enum PasswordSource {
    /// Entered by the user.
    Manual(String),
    /// Drawn from the generator.
    Generated {
        length: usize,
        policy: PasswordPolicy,
    },
}

/// Metadata about the store that needs no decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultStatus {
    pub key_store: KeyStoreState,
    pub modulus_bits: Option<usize>,
    pub fingerprint: Option<String>,
    pub vault_present: bool,
    pub pin_configured: bool,
}

/// Entry point for every vault operation.
#[derive(Debug, Clone)]
pub struct VaultService {
    layout: VaultLayout,
    keys: KeyManager,
    vault: Vault,
    pins: PinStore,
}

impl VaultService {
    pub fn new(config: &LockboxConfig) -> Self {
        Self::with_layout(
            VaultLayout::from_config(&config.storage),
            config.keys.rsa_bits,
        )
    }

    pub fn with_layout(layout: VaultLayout, rsa_bits: usize) -> Self {
        Self {
            keys: KeyManager::new(&layout, rsa_bits),
            vault: Vault::new(layout.vault.clone()),
            pins: PinStore::new(layout.pin.clone()),
            layout,
        }
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    /// Prepare the store for use. Safe to call on every start.
    ///
    /// Generates the key set when none exists and seals an empty vault when
    /// there is no vault data. Returns `true` if keys were generated.
    ///
    /// Refuses with [`VaultError::KeyStoreCorrupt`] when the key set is
    /// missing but vault or PIN ciphertext is present: new keys could never
    /// open it.
    pub fn initialize(&self) -> Result<bool, VaultError> {
        if self.keys.state()? == KeyStoreState::Absent
            && (self.vault.has_data()? || self.pins.exists()?)
        {
            warn!(
                vault = %self.layout.vault.display(),
                "key files missing while encrypted data exists"
            );
            return Err(VaultError::KeyStoreCorrupt(format!(
                "key files are missing but {} or {} holds encrypted data; restore the keys from backup",
                self.layout.vault.display(),
                self.layout.pin.display()
            )));
        }

        let created = self.keys.initialize()?;
        if !self.vault.has_data()? {
            let key = self.keys.unwrap_symmetric_key()?;
            self.vault.store(&Records::default(), &key)?;
            info!(path = %self.layout.vault.display(), "created empty vault");
        }
        Ok(created)
    }

    /// Generate a password. Touches no files.
    pub fn generate_password(
        &self,
        length: usize,
        policy: &PasswordPolicy,
    ) -> Result<String, VaultError> {
        generator::generate(length, policy)
    }

    /// Store credentials, replacing any record with the same canonical key.
    pub fn save(&self, site: &str, username: &str, password: &str) -> Result<(), VaultError> {
        let site = site_key(site)?;
        let record = CredentialRecord {
            site: site.display.clone(),
            username: username.to_string(),
            password: password.to_string(),
        };
        self.with_records(|records| records.upsert(site.key.clone(), record))?;
        debug!(key = %site.key, "credentials saved");
        Ok(())
    }

    /// Fetch the record for `site`, or [`VaultError::NotFound`].
    pub fn get(&self, site: &str) -> Result<CredentialRecord, VaultError> {
        let key = site_key(site)?;
        let found = self.with_records(|records| records.get(&key.key).cloned())?;
        debug!(key = %key.key, found = found.is_some(), "credentials looked up");
        found.ok_or_else(|| VaultError::NotFound {
            site: site.to_string(),
        })
    }

    /// Remove the record for `site`. Returns whether one was removed.
    pub fn delete(&self, site: &str) -> Result<bool, VaultError> {
        let key = site_key(site)?;
        let removed = self.with_records(|records| records.remove(&key.key))?;
        debug!(key = %key.key, removed, "credentials deleted");
        Ok(removed)
    }

    /// Whether `site` has a record, and its username if so.
    pub fn exists(&self, site: &str) -> Result<(bool, Option<String>), VaultError> {
        let key = site_key(site)?;
        let username = self.with_records(|records| {
            records.get(&key.key).map(|record| record.username.clone())
        })?;
        Ok((username.is_some(), username))
    }

    /// Store a new password for `site` and return it.
    pub fn reset(
        &self,
        site: &str,
        username: &str,
        source: PasswordSource,
    ) -> Result<String, VaultError> {
        let password = match source {
            PasswordSource::Manual(password) => {
                if password.is_empty() {
                    return Err(VaultError::InvalidInput(
                        "password must not be empty".to_string(),
                    ));
                }
                password
            }
            PasswordSource::Generated { length, policy } => generator::generate(length, &policy)?,
        };
        self.save(site, username, &password)?;
        Ok(password)
    }

    /// Replace all key material and re-encrypt the vault and PIN under it.
    ///
    /// Everything is decrypted under the old key before any key file is
    /// touched. Once the new key set is in place, a failure to re-seal the
    /// vault or PIN is [`VaultError::RotationIncomplete`].
    pub fn rotate_keys(&self) -> Result<(), VaultError> {
        let old_key = self.keys.unwrap_symmetric_key()?;
        let records = self.vault.load(&old_key)?;
        let pin = self.pins.load(&old_key)?;
        drop(old_key);

        let new_key = self.keys.rotate()?;

        self.vault
            .store(&records, &new_key)
            .map_err(|e| e.into_rotation_incomplete("re-encrypting vault"))?;
        if let Some(pin) = &pin {
            self.pins
                .store(pin, &new_key)
                .map_err(|e| e.into_rotation_incomplete("re-encrypting PIN"))?;
        }

        info!(
            records = records.len(),
            pin = pin.is_some(),
            "keys rotated and data re-encrypted"
        );
        Ok(())
    }

    pub fn has_pin(&self) -> Result<bool, VaultError> {
        self.pins.exists()
    }

    /// Create or replace the PIN.
    pub fn set_pin(&self, pin: &SecretString) -> Result<(), VaultError> {
        if pin.expose_secret().is_empty() {
            return Err(VaultError::InvalidInput("PIN must not be empty".to_string()));
        }
        let key = self.keys.unwrap_symmetric_key()?;
        self.pins.store(pin.expose_secret(), &key)?;
        info!("PIN set");
        Ok(())
    }

    /// Check `candidate` against the stored PIN.
    ///
    /// Returns `false` when no PIN is configured. The PIN file is re-sealed
    /// like every other read.
    pub fn verify_pin(&self, candidate: &SecretString) -> Result<bool, VaultError> {
        let key = self.keys.unwrap_symmetric_key()?;
        let Some(stored) = self.pins.load(&key)? else {
            return Ok(false);
        };
        let matches = constant_time_eq(stored.as_bytes(), candidate.expose_secret().as_bytes());
        self.pins.store(&stored, &key)?;
        if !matches {
            warn!("PIN verification failed");
        }
        Ok(matches)
    }

    /// Delete the PIN. Returns whether one was configured.
    pub fn remove_pin(&self) -> Result<bool, VaultError> {
        let removed = self.pins.remove()?;
        if removed {
            info!("PIN removed");
        }
        Ok(removed)
    }

    /// Hex SHA-256 of the current public key.
    pub fn key_fingerprint(&self) -> Result<String, VaultError> {
        self.keys.fingerprint()
    }

    /// Describe the store without decrypting anything.
    pub fn status(&self) -> Result<VaultStatus, VaultError> {
        let key_store = self.keys.state()?;
        let (modulus_bits, fingerprint) = if key_store == KeyStoreState::Complete {
            (
                Some(self.keys.modulus_bits()?),
                Some(self.keys.fingerprint()?),
            )
        } else {
            (None, None)
        };
        Ok(VaultStatus {
            key_store,
            modulus_bits,
            fingerprint,
            vault_present: self.vault.has_data()?,
            pin_configured: self.pins.exists()?,
        })
    }

    /// Unwrap, load, apply `f`, re-seal. The write happens only after a
    /// successful load.
    fn with_records<R>(&self, f: impl FnOnce(&mut Records) -> R) -> Result<R, VaultError> {
        let key = self.keys.unwrap_symmetric_key()?;
        let mut records = self.vault.load(&key)?;
        let out = f(&mut records);
        self.vault.store(&records, &key)?;
        Ok(out)
    }
}

fn site_key(raw_site: &str) -> Result<SiteKey, VaultError> {
    if raw_site.trim().is_empty() {
        return Err(VaultError::InvalidInput(
            "site must not be empty".to_string(),
        ));
    }
    Ok(canonicalize(raw_site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn service(dir: &std::path::Path) -> VaultService {
        let service = VaultService::with_layout(VaultLayout::in_dir(dir), 1024);
        service.initialize().unwrap();
        service
    }

    #[test]
    fn blank_site_is_invalid_input() {
        let dir = tempdir().unwrap();
        let service = service(dir.path());

        for site in ["", "   "] {
            assert!(matches!(
                service.save(site, "alice", "pw"),
                Err(VaultError::InvalidInput(_))
            ));
            assert!(matches!(service.get(site), Err(VaultError::InvalidInput(_))));
        }
    }

    #[test]
    fn not_found_is_recoverable() {
        let dir = tempdir().unwrap();
        let err = service(dir.path()).get("nowhere.com").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert!(!err.is_fatal());
    }

    #[test]
    fn empty_manual_password_is_rejected() {
        let dir = tempdir().unwrap();
        let result = service(dir.path()).reset(
            "example.com",
            "alice",
            PasswordSource::Manual(String::new()),
        );
        assert!(matches!(result, Err(VaultError::InvalidInput(_))));
    }

    #[test]
    fn vault_write_failure_after_key_swap_is_incomplete() {
        let dir = tempdir().unwrap();
        let layout = VaultLayout::in_dir(dir.path());
        let service = service(dir.path());
        service.save("example.com", "alice", "pw").unwrap();

        let err = {
            let _fault = crate::fsio::faults::fail_at(&layout.vault);
            service.rotate_keys().unwrap_err()
        };

        assert_eq!(err.kind(), crate::error::ErrorKind::RotationIncomplete);
        assert!(err.is_fatal());
        // The vault is still sealed under the replaced key.
        assert!(matches!(
            service.get("example.com"),
            Err(VaultError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn pin_write_failure_after_key_swap_is_incomplete() {
        let dir = tempdir().unwrap();
        let layout = VaultLayout::in_dir(dir.path());
        let service = service(dir.path());
        service.save("example.com", "alice", "pw").unwrap();
        service.set_pin(&SecretString::from("2468".to_string())).unwrap();

        let err = {
            let _fault = crate::fsio::faults::fail_at(&layout.pin);
            service.rotate_keys().unwrap_err()
        };

        assert!(matches!(err, VaultError::RotationIncomplete(ref m) if m.contains("PIN")));
        // The vault itself made it across.
        assert_eq!(service.get("example.com").unwrap().password, "pw");
    }

    #[test]
    fn status_reports_without_decrypting() {
        let dir = tempdir().unwrap();
        let uninitialized = VaultService::with_layout(VaultLayout::in_dir(dir.path()), 1024);
        let status = uninitialized.status().unwrap();
        assert_eq!(status.key_store, KeyStoreState::Absent);
        assert!(status.fingerprint.is_none());
        assert!(!status.vault_present);

        uninitialized.initialize().unwrap();
        let status = uninitialized.status().unwrap();
        assert_eq!(status.key_store, KeyStoreState::Complete);
        assert_eq!(status.modulus_bits, Some(1024));
        assert!(status.vault_present);
        assert!(!status.pin_configured);
    }
}
