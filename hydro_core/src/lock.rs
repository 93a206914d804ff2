//! Sidecar lock files.
//!
//! Files that get replaced (settings) or renamed (journal) cannot carry
//! their own lock across a read-modify-write cycle: a waiter would end up
//! holding a lock on the old inode. A stable `<name>.lock` file next to
//! them is locked instead.

use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Path of the sidecar lock for `path` (`intake.jsonl` -> `intake.jsonl.lock`)
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

/// Exclusive lock held until dropped
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Block until the sidecar lock for `path` is held exclusively
    pub fn exclusive(path: &Path) -> Result<Self> {
        let lock_path = sidecar_path(path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock_exclusive()?;

        tracing::trace!("Acquired lock {:?}", lock_path);
        Ok(Self {
            file,
            path: lock_path,
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}
