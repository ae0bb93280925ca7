//! File system helpers shared by the scanner and installer code.

use crate::error::{MidletError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursively delete `path`, children before parents.
///
/// Best effort: entries that cannot be removed are logged and skipped, and the
/// walk carries on. A missing path is not an error. Returns the number of
/// entries left behind.
pub fn delete_directory(path: &Path) -> usize {
    if fs::symlink_metadata(path).is_err() {
        return 0;
    }

    let mut failures = 0;
    for entry in WalkDir::new(path).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot walk {}: {}", path.display(), e);
                failures += 1;
                continue;
            }
        };

        let result = if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())
        } else {
            fs::remove_file(entry.path())
        };

        if let Err(e) = result {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to delete {}: {}", entry.path().display(), e);
                failures += 1;
            }
        }
    }

    debug!("Deleted {} ({} failures)", path.display(), failures);
    failures
}

/// Recursively move the entries of `src` accepted by `filter` into `dest`.
///
/// Matching directories are recreated under `dest` and descended into;
/// matching files are renamed to the mirrored location. Individual renames
/// that fail are logged and skipped.
pub fn move_files<F>(src: &Path, dest: &Path, filter: F) -> Result<()>
where
    F: Fn(&Path) -> bool,
{
    move_files_inner(src, dest, &filter)
}

fn move_files_inner(src: &Path, dest: &Path, filter: &dyn Fn(&Path) -> bool) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| MidletError::io_at("create directory", dest, e))?;

    let entries = fs::read_dir(src).map_err(|e| MidletError::io_at("list directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| MidletError::io_at("list directory", src, e))?;
        let from = entry.path();
        if !filter(&from) {
            continue;
        }

        let to = dest.join(entry.file_name());
        if from.is_dir() {
            move_files_inner(&from, &to, filter)?;
        } else if let Err(e) = fs::rename(&from, &to) {
            warn!("Failed to move {} to {}: {}", from.display(), to.display(), e);
        }
    }

    Ok(())
}

/// Copy `src` to `dest` byte for byte, returning the number of bytes copied.
///
/// Both files are closed when this returns, whether or not the copy succeeded.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    let mut reader = File::open(src).map_err(|e| MidletError::io_at("open source", src, e))?;
    let mut writer =
        File::create(dest).map_err(|e| MidletError::io_at("create destination", dest, e))?;

    let copied = io::copy(&mut reader, &mut writer)
        .map_err(|e| MidletError::io_at("copy file", dest, e))?;
    writer
        .sync_all()
        .map_err(|e| MidletError::io_at("sync file", dest, e))?;

    debug!("Copied {} bytes from {} to {}", copied, src.display(), dest.display());
    Ok(copied)
}

/// Names of the direct entries of `dir`, in listing order.
///
/// A missing or unreadable directory yields an empty list. Entries whose
/// names are not valid UTF-8 cannot be stored as record keys; they are
/// logged and left out.
pub fn list_dir_names(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Cannot list {}: {}", dir.display(), e);
            }
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                warn!("Ignoring non UTF-8 entry {:?} in {}", raw, dir.display());
                None
            }
        })
        .collect()
}

/// Resolve `name` under `dir`, refusing names that would escape it.
pub fn child_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    let mut components = candidate.components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Some(dir.join(candidate)),
        _ => None,
    }
}
