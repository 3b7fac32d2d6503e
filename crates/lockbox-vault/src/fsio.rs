// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe file writes.
//!
//! Data goes to a temporary file in the target's directory, is synced, then
//! renamed over the target, and the directory is synced. After a crash the
//! target holds either the old or the new content, never a partial write.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::VaultError;

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    let temp_name = format!(".{file_name}.tmp.{}", Uuid::new_v4());
    match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Flush a directory entry change, such as a rename or removal, to disk.
pub fn sync_dir(dir: &Path) -> Result<(), VaultError> {
    #[cfg(test)]
    faults::check(dir)?;
    fsync_dir(dir).map_err(|e| VaultError::storage(dir, e))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn create_file(path: &Path, private: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;
    options.open(path)
}

/// A fully written temp file waiting to be renamed over its target.
///
/// Dropping a `StagedFile` without calling [`StagedFile::commit`] removes the
/// temp file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `data` to a synced temp file next to `path`.
    ///
    /// `private` restricts the file to its owner on Unix.
    pub fn stage(path: &Path, data: &[u8], private: bool) -> Result<Self, VaultError> {
        let parent = parent_dir(path);
        fs::create_dir_all(parent).map_err(|e| VaultError::storage(parent, e))?;

        let temp = temp_path(path);
        let staged = Self {
            temp_path: temp.clone(),
            final_path: path.to_path_buf(),
            committed: false,
        };

        let mut file = create_file(&temp, private).map_err(|e| VaultError::storage(&temp, e))?;
        file.write_all(data)
            .and_then(|()| file.sync_all())
            .map_err(|e| VaultError::storage(&temp, e))?;

        Ok(staged)
    }

    /// Atomically replace the target with the staged content.
    pub fn commit(self) -> Result<(), VaultError> {
        let dir = self.rename()?;
        sync_dir(&dir)
    }

    /// Rename the temp file over the target without syncing the directory.
    ///
    /// Once this returns `Ok` the new content is in place; the caller owns
    /// the [`sync_dir`] of the returned directory.
    pub fn rename(mut self) -> Result<PathBuf, VaultError> {
        #[cfg(test)]
        faults::check(&self.final_path)?;
        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|e| VaultError::storage(&self.final_path, e))?;
        self.committed = true;
        Ok(parent_dir(&self.final_path).to_path_buf())
    }

    pub fn target(&self) -> &Path {
        &self.final_path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Atomically write `data` to `path`.
pub fn atomic_write(path: &Path, data: &[u8], private: bool) -> Result<(), VaultError> {
    StagedFile::stage(path, data, private)?.commit()
}

/// Read a file, mapping "does not exist" to `None`.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, VaultError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(VaultError::storage(path, e)),
    }
}

/// Remove a file, returning whether it existed.
pub fn remove_if_exists(path: &Path) -> Result<bool, VaultError> {
    match fs::remove_file(path) {
        Ok(()) => {
            sync_dir(parent_dir(path))?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(VaultError::storage(path, e)),
    }
}
