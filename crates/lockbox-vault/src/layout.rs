// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolved locations of the five persisted artifacts.

use std::path::{Path, PathBuf};

use lockbox_config::StorageConfig;

/// Absolute or relative paths of every artifact the vault reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub wrapped_key: PathBuf,
    pub vault: PathBuf,
    pub pin: PathBuf,
}

impl VaultLayout {
    /// Resolve artifact paths from the `[storage]` config section.
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::resolve(Path::new(&storage.data_dir), storage)
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::resolve(dir.as_ref(), &StorageConfig::default())
    }

    fn resolve(dir: &Path, storage: &StorageConfig) -> Self {
        Self {
            public_key: dir.join(&storage.public_key_file),
            private_key: dir.join(&storage.private_key_file),
            wrapped_key: dir.join(&storage.wrapped_key_file),
            vault: dir.join(&storage.vault_file),
            pin: dir.join(&storage.pin_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_default_names() {
        let layout = VaultLayout::in_dir("/var/lib/lockbox");
        assert_eq!(layout.vault, Path::new("/var/lib/lockbox/vault.bin"));
        assert_eq!(layout.pin, Path::new("/var/lib/lockbox/pin.bin"));
        assert_eq!(
            layout.wrapped_key,
            Path::new("/var/lib/lockbox/symmetric.key")
        );
    }

    #[cfg(unix)]
    #[test]
    fn in_dir_keeps_non_utf8_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new("/tmp").join(OsStr::from_bytes(b"lock\xffbox"));
        let layout = VaultLayout::in_dir(&dir);
        assert_eq!(layout.vault, dir.join("vault.bin"));
        assert_eq!(layout.private_key.parent(), Some(dir.as_path()));
    }

    #[test]
    fn from_config_honours_custom_names() {
        let storage = StorageConfig {
            data_dir: "data".to_string(),
            vault_file: "passwords.bin".to_string(),
            ..StorageConfig::default()
        };
        let layout = VaultLayout::from_config(&storage);
        assert_eq!(layout.vault, Path::new("data/passwords.bin"));
        assert_eq!(layout.public_key, Path::new("data/public.pem"));
    }
}
