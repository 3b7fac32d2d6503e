// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope-encrypted credential vault for Lockbox.
//!
//! Credentials are kept in a single AES-256-GCM sealed file. The AES key is
//! itself wrapped under an RSA public key with OAEP; the RSA pair never
//! encrypts vault data directly. Everything goes through [`VaultService`]:
//! - site names are canonicalized before they are used as keys,
//! - every load of the mapping re-seals and atomically rewrites the file,
//! - key rotation decrypts under the old key and re-encrypts the vault and
//!   PIN under the new one.

pub mod canonical;
pub mod envelope;
pub mod error;
pub mod fsio;
pub mod generator;
pub mod keys;
pub mod layout;
pub mod pin;
pub mod service;
pub mod store;

pub use canonical::{canonicalize, SiteKey};
pub use envelope::SymmetricKey;
pub use error::{ErrorKind, VaultError};
pub use generator::{CharClass, PasswordPolicy};
pub use keys::{KeyManager, KeyStoreState};
pub use layout::VaultLayout;
pub use service::{PasswordSource, VaultService, VaultStatus};
pub use store::CredentialRecord;
