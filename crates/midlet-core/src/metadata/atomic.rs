//! Atomic JSON persistence for small launcher-owned state files.
//!
//! A write lands in `<name>.<pid>.tmp` beside the target, is synced, then
//! renamed over the target. Readers see the old list or the new one.

use crate::{MidletError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Load a JSON state file. A missing file is `Ok(None)`.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MidletError::io_at("read state file", path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| MidletError::Json {
            message: format!("{} is not valid JSON: {}", path.display(), e),
            source: Some(e),
        })
}

/// Replace a JSON state file in one rename.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| MidletError::io_at("create state directory", parent, e))?;
    }

    let body = serde_json::to_vec_pretty(data)?;
    let temp_path = temp_path_for(path);

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(&body)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(MidletError::io_at("write state file", &temp_path, e));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        MidletError::io_at("replace state file", path, e)
    })?;

    debug!("Wrote {} ({} bytes)", path.display(), body.len());
    Ok(())
}
