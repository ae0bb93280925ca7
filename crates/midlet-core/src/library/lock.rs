//! Single-writer lock for the apps root.
//!
//! Reconciliation reads the directory listing, then deletes and inserts
//! records based on it. An install landing in between would be missed or,
//! worse, purged half-written. Everything that mutates the apps root holds
//! this lock: an in-process mutex plus an exclusive advisory lock on a file
//! next to the apps root, so separate processes are serialized as well.

use crate::error::{MidletError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Lock guarding mutation of one apps root.
#[derive(Debug)]
pub struct ReconcileLock {
    path: PathBuf,
    local: Mutex<()>,
}

/// Held while the apps root is being mutated. Released on drop.
#[derive(Debug)]
pub struct ReconcileGuard<'a> {
    file: File,
    path: &'a Path,
    _local: MutexGuard<'a, ()>,
}

impl ReconcileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            local: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the lock is held by this caller.
    pub fn acquire(&self) -> Result<ReconcileGuard<'_>> {
        let local = self.local.lock().map_err(|_| MidletError::LockFailed {
            path: self.path.clone(),
            message: "in-process lock poisoned".to_string(),
        })?;

        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(|e| MidletError::LockFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        debug!("Acquired reconcile lock {}", self.path.display());
        Ok(ReconcileGuard {
            file,
            path: &self.path,
            _local: local,
        })
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(&self) -> Result<Option<ReconcileGuard<'_>>> {
        let local = match self.local.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::WouldBlock) => return Ok(None),
            Err(std::sync::TryLockError::Poisoned(_)) => {
                return Err(MidletError::LockFailed {
                    path: self.path.clone(),
                    message: "in-process lock poisoned".to_string(),
                })
            }
        };

        let file = self.open()?;
        if FileExt::try_lock_exclusive(&file).is_err() {
            return Ok(None);
        }

        Ok(Some(ReconcileGuard {
            file,
            path: &self.path,
            _local: local,
        }))
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MidletError::io_at("create lock directory", parent, e))?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| MidletError::io_at("open lock file", &self.path, e))
    }
}

impl ReconcileGuard<'_> {
    /// Whether this guard was handed out by `lock`.
    pub fn is_for(&self, lock: &ReconcileLock) -> bool {
        std::ptr::eq(self.path, lock.path.as_path())
    }
}

impl Drop for ReconcileGuard<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Released reconcile lock {}", self.path.display());
    }
}
