// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RSA key pair and wrapped symmetric key management.
//!
//! The key set is three artifacts:
//! - the RSA public key (SPKI PEM),
//! - the RSA private key (PKCS#8 PEM, owner-only on Unix),
//! - the vault's AES-256 key, RSA-OAEP(SHA-256)-wrapped under the public key.
//!
//! The RSA pair never touches vault data; it only wraps the symmetric key.
//! Nothing is cached: every operation reads the artifacts, and the unwrapped
//! key lives only as long as the caller holds the returned [`SymmetricKey`].

use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::envelope::SymmetricKey;
use crate::error::VaultError;
use crate::fsio::{self, StagedFile};
use crate::layout::VaultLayout;

/// Which of the three key artifacts exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreState {
    /// None exist: first run.
    Absent,
    /// All three exist.
    Complete,
    /// Some but not all exist.
    Partial { missing: Vec<PathBuf> },
}

/// Owner of the key artifacts.
#[derive(Debug, Clone)]
pub struct KeyManager {
    public_key: PathBuf,
    private_key: PathBuf,
    wrapped_key: PathBuf,
    rsa_bits: usize,
}

/// Freshly generated key set, encoded for disk.
struct KeyMaterial {
    public_pem: String,
    private_pem: Zeroizing<String>,
    wrapped: Vec<u8>,
}

impl KeyManager {
    /// `rsa_bits` is the modulus size of key pairs this manager generates.
    pub fn new(layout: &VaultLayout, rsa_bits: usize) -> Self {
        Self {
            public_key: layout.public_key.clone(),
            private_key: layout.private_key.clone(),
            wrapped_key: layout.wrapped_key.clone(),
            rsa_bits,
        }
    }

    fn files(&self) -> [&Path; 3] {
        [&self.wrapped_key, &self.private_key, &self.public_key]
    }

    /// Inspect which key artifacts exist.
    pub fn state(&self) -> Result<KeyStoreState, VaultError> {
        let mut missing = Vec::new();
        for path in self.files() {
            let exists = path
                .try_exists()
                .map_err(|e| VaultError::storage(path, e))?;
            if !exists {
                missing.push(path.to_path_buf());
            }
        }

        Ok(match missing.len() {
            0 => KeyStoreState::Complete,
            3 => KeyStoreState::Absent,
            _ => KeyStoreState::Partial { missing },
        })
    }

    /// Create the key set if none exists.
    ///
    /// Returns `true` if keys were generated, `false` if a complete key set
    /// was already present. A partial key set is [`VaultError::KeyStoreCorrupt`].
    pub fn initialize(&self) -> Result<bool, VaultError> {
        match self.state()? {
            KeyStoreState::Complete => {
                debug!("key store already initialized");
                Ok(false)
            }
            KeyStoreState::Partial { missing } => {
                warn!(missing = missing.len(), "refusing to initialize over a partial key store");
                Err(partial_key_store(&missing))
            }
            KeyStoreState::Absent => {
                let (material, _key) = self.generate()?;
                let staged = self.stage(&material)?;
                if let Err((committed, err)) = commit_all(staged) {
                    // Back to the first-run state.
                    for path in &self.files()[..committed] {
                        let _ = fsio::remove_if_exists(path);
                    }
                    return Err(err);
                }
                info!(rsa_bits = self.rsa_bits, "key store initialized");
                Ok(true)
            }
        }
    }

    /// Decrypt the wrapped symmetric key with the private key.
    pub fn unwrap_symmetric_key(&self) -> Result<SymmetricKey, VaultError> {
        let private = self.load_private_key()?;
        let wrapped = read_key_file(&self.wrapped_key)?;

        let bytes = Zeroizing::new(private.decrypt(Oaep::new::<Sha256>(), &wrapped).map_err(
            |_| {
                VaultError::KeyStoreCorrupt(format!(
                    "{} cannot be unwrapped with {}",
                    self.wrapped_key.display(),
                    self.private_key.display()
                ))
            },
        )?);

        SymmetricKey::from_slice(&bytes).ok_or_else(|| {
            VaultError::KeyStoreCorrupt(format!(
                "unwrapped key is {} bytes, expected {}",
                bytes.len(),
                crate::envelope::KEY_LEN
            ))
        })
    }

    /// Wrap `key` under the stored public key.
    pub fn wrap_symmetric_key(&self, key: &SymmetricKey) -> Result<Vec<u8>, VaultError> {
        let public = self.load_public_key()?;
        wrap(&public, key)
    }

    /// Replace the whole key set with a new RSA pair and a new symmetric key.
    ///
    /// Returns the new symmetric key so the caller can re-encrypt everything
    /// it decrypted under the old one. Vault data is not touched here.
    ///
    /// All three artifacts are staged before any is replaced; a failure while
    /// staging leaves the old key set intact. A failure after the first
    /// artifact was swapped in is [`VaultError::RotationIncomplete`].
    pub fn rotate(&self) -> Result<SymmetricKey, VaultError> {
        match self.state()? {
            KeyStoreState::Complete => {}
            KeyStoreState::Absent => {
                return Err(VaultError::KeyStoreCorrupt(
                    "cannot rotate: no key store exists".to_string(),
                ));
            }
            KeyStoreState::Partial { missing } => return Err(partial_key_store(&missing)),
        }

        let (material, key) = self.generate()?;
        let staged = self.stage(&material)?;
        commit_all(staged).map_err(|(committed, err)| {
            if committed == 0 {
                err
            } else {
                VaultError::RotationIncomplete(format!(
                    "{committed} of 3 key files replaced: {err}"
                ))
            }
        })?;

        info!(rsa_bits = self.rsa_bits, "key store rotated");
        Ok(key)
    }

    /// Hex SHA-256 of the public key's DER encoding.
    pub fn fingerprint(&self) -> Result<String, VaultError> {
        let public = self.load_public_key()?;
        let der = public
            .to_public_key_der()
            .map_err(|e| VaultError::KeyStoreCorrupt(format!("cannot encode public key: {e}")))?;
        Ok(hex::encode(Sha256::digest(der.as_bytes())))
    }

    /// Modulus size of the stored key pair, in bits.
    pub fn modulus_bits(&self) -> Result<usize, VaultError> {
        Ok(self.load_public_key()?.size() * 8)
    }

    /// Modulus size used for newly generated key pairs.
    pub fn rsa_bits(&self) -> usize {
        self.rsa_bits
    }

    fn generate(&self) -> Result<(KeyMaterial, SymmetricKey), VaultError> {
        debug!(rsa_bits = self.rsa_bits, "generating RSA key pair");
        let private = RsaPrivateKey::new(&mut OsRng, self.rsa_bits)
            .map_err(|e| VaultError::Internal(format!("RSA key generation failed: {e}")))?;
        let public = RsaPublicKey::from(&private);
        let key = SymmetricKey::generate()?;

        let material = KeyMaterial {
            public_pem: public
                .to_public_key_pem(LineEnding::LF)
                .map_err(|e| VaultError::Internal(format!("cannot encode public key: {e}")))?,
            private_pem: private
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| VaultError::Internal(format!("cannot encode private key: {e}")))?,
            wrapped: wrap(&public, &key)?,
        };
        Ok((material, key))
    }

    /// Stage in commit order: wrapped key, private key, public key.
    fn stage(&self, material: &KeyMaterial) -> Result<Vec<StagedFile>, VaultError> {
        Ok(vec![
            StagedFile::stage(&self.wrapped_key, &material.wrapped, false)?,
            StagedFile::stage(&self.private_key, material.private_pem.as_bytes(), true)?,
            StagedFile::stage(&self.public_key, material.public_pem.as_bytes(), false)?,
        ])
    }

    fn load_private_key(&self) -> Result<RsaPrivateKey, VaultError> {
        let bytes = Zeroizing::new(read_key_file(&self.private_key)?);
        let pem = std::str::from_utf8(&bytes).map_err(|_| {
            VaultError::KeyStoreCorrupt(format!("{} is not PEM", self.private_key.display()))
        })?;
        RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| {
            VaultError::KeyStoreCorrupt(format!(
                "{} is not a PKCS#8 RSA private key: {e}",
                self.private_key.display()
            ))
        })
    }

    fn load_public_key(&self) -> Result<RsaPublicKey, VaultError> {
        let bytes = read_key_file(&self.public_key)?;
        let pem = std::str::from_utf8(&bytes).map_err(|_| {
            VaultError::KeyStoreCorrupt(format!("{} is not PEM", self.public_key.display()))
        })?;
        RsaPublicKey::from_public_key_pem(pem).map_err(|e| {
            VaultError::KeyStoreCorrupt(format!(
                "{} is not an RSA public key: {e}",
                self.public_key.display()
            ))
        })
    }
}

fn wrap(public: &RsaPublicKey, key: &SymmetricKey) -> Result<Vec<u8>, VaultError> {
    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| VaultError::Internal(format!("RSA-OAEP wrap failed: {e}")))
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, VaultError> {
    fsio::read_optional(path)?
        .ok_or_else(|| VaultError::KeyStoreCorrupt(format!("{} is missing", path.display())))
}

fn partial_key_store(missing: &[PathBuf]) -> VaultError {
    let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
    VaultError::KeyStoreCorrupt(format!(
        "partial key store, missing: {}",
        names.join(", ")
    ))
}

/// Commit staged files in order, reporting how many landed before a failure.
///
/// A file counts as landed once its rename succeeds, even if the directory
/// sync that follows fails.
fn commit_all(staged: Vec<StagedFile>) -> Result<(), (usize, VaultError)> {
    let mut committed = 0;
    // Uncommitted files left in the iterator are cleaned up on drop.
    for file in staged {
        let dir = file.rename().map_err(|err| (committed, err))?;
        committed += 1;
        fsio::sync_dir(&dir).map_err(|err| (committed, err))?;
    }
    Ok(())
}
