// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM sealing of serialized payloads.
//!
//! Sealed layout: `version (1) || nonce (12) || ciphertext || tag (16)`.
//! The version byte is authenticated as associated data. Every call to
//! [`seal`] draws a fresh random 96-bit nonce from the system CSPRNG; nonce
//! reuse under one key would break GCM.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::VaultError;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Size in bytes of the symmetric key.
pub const KEY_LEN: usize = 32;

const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// The vault's AES-256-GCM key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Generate a random key from the system CSPRNG.
    pub fn generate() -> Result<Self, VaultError> {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut key)
            .map_err(|_| VaultError::Internal("failed to generate random key".to_string()))?;
        Ok(Self(key))
    }

    /// Build a key from exactly [`KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn aead_key(&self) -> Result<LessSafeKey, VaultError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.0)
            .map_err(|_| VaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Encrypt raw bytes under `key`.
pub fn seal_bytes(plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, VaultError> {
    let aead = key.aead_key()?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Internal("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut sealed = Vec::with_capacity(HEADER_LEN + plaintext.len() + TAG_LEN);
    sealed.push(ENVELOPE_VERSION);
    sealed.extend_from_slice(&nonce_bytes);

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    let result = aead.seal_in_place_append_tag(nonce, Aad::from([ENVELOPE_VERSION]), &mut in_out);
    if result.is_err() {
        in_out.zeroize();
        return Err(VaultError::Internal("AES-256-GCM encryption failed".to_string()));
    }
    sealed.extend_from_slice(&in_out);

    Ok(sealed)
}

/// Decrypt bytes produced by [`seal_bytes`].
///
/// Fails with [`VaultError::DecryptionFailed`] on a wrong key, any modified
/// byte, truncation, or an unknown version.
pub fn open_bytes(sealed: &[u8], key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    if sealed.len() < HEADER_LEN + TAG_LEN {
        return Err(VaultError::DecryptionFailed(format!(
            "ciphertext truncated ({} bytes)",
            sealed.len()
        )));
    }

    let (header, body) = sealed.split_at(HEADER_LEN);
    let version = header[0];
    if version != ENVELOPE_VERSION {
        return Err(VaultError::DecryptionFailed(format!(
            "unsupported envelope version {version}"
        )));
    }
    let nonce = Nonce::try_assume_unique_for_key(&header[1..])
        .map_err(|_| VaultError::DecryptionFailed("malformed nonce".to_string()))?;

    let aead = key.aead_key()?;
    let mut in_out = Zeroizing::new(body.to_vec());
    let plaintext_len = aead
        .open_in_place(nonce, Aad::from([version]), &mut in_out)
        .map_err(|_| {
            VaultError::DecryptionFailed("wrong key or corrupted data".to_string())
        })?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Serialize `value` and seal it under `key`.
pub fn seal<T: Serialize + ?Sized>(value: &T, key: &SymmetricKey) -> Result<Vec<u8>, VaultError> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(value)
            .map_err(|e| VaultError::Internal(format!("failed to serialize payload: {e}")))?,
    );
    seal_bytes(&plaintext, key)
}

/// Open a sealed payload and deserialize it.
///
/// An authentic payload that does not deserialize is reported as
/// [`VaultError::DecryptionFailed`]: nothing partially decoded is returned.
pub fn open<T: DeserializeOwned>(sealed: &[u8], key: &SymmetricKey) -> Result<T, VaultError> {
    let plaintext = open_bytes(sealed, key)?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::DecryptionFailed(format!("payload is not well-formed: {e}")))
}
