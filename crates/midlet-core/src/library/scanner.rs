//! Application directory scanner.
//!
//! Turns directory names under the apps root into [`AppItem`] records. A
//! directory that is not a valid install is deleted on the spot; one broken
//! app never stops the rest of the scan.

use crate::config::LayoutConfig;
use crate::error::{MidletError, Result};
use crate::file_utils::{child_path, delete_directory};
use crate::manifest::Descriptor;
use crate::models::AppItem;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of scanning a batch of directory names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Valid applications, in input order.
    pub apps: Vec<AppItem>,
    /// Names that were removed because they were not valid installs.
    pub purged: Vec<String>,
}

/// Scans application directories under one apps root.
#[derive(Debug, Clone)]
pub struct AppScanner {
    apps_dir: PathBuf,
}

impl AppScanner {
    pub fn new(apps_dir: impl Into<PathBuf>) -> Self {
        Self {
            apps_dir: apps_dir.into(),
        }
    }

    pub fn apps_dir(&self) -> &Path {
        &self.apps_dir
    }

    /// Scan `names`, purging every entry that is not a valid application.
    pub fn scan(&self, names: &[String]) -> ScanReport {
        let mut report = ScanReport::default();

        for name in names {
            let Some(dir) = child_path(&self.apps_dir, name) else {
                warn!("Skipping invalid application directory name {:?}", name);
                continue;
            };

            if fs::symlink_metadata(&dir).is_err() {
                warn!("Application directory {} disappeared during scan", name);
                continue;
            }

            match self.load_app(&dir) {
                Ok(item) => report.apps.push(item),
                Err(e) => {
                    warn!("Removing application {}: {}", name, e);
                    let failures = delete_directory(&dir);
                    if failures == 0 {
                        report.purged.push(name.clone());
                    } else {
                        warn!("{} entries of {} could not be removed", failures, name);
                    }
                }
            }
        }

        debug!(
            "Scanned {} directories: {} apps, {} purged",
            names.len(),
            report.apps.len(),
            report.purged.len()
        );
        report
    }

    /// Validate one application directory and build its record.
    pub fn load_app(&self, dir: &Path) -> Result<AppItem> {
        if !dir.is_dir() {
            return Err(MidletError::NotADirectory(dir.to_path_buf()));
        }

        if !dir.join(LayoutConfig::MIDLET_DEX_ARCH).is_file()
            && !dir.join(LayoutConfig::MIDLET_DEX_FILE).is_file()
        {
            return Err(MidletError::MissingArtifact {
                dir: dir.to_path_buf(),
            });
        }

        let descriptor = Descriptor::load(&dir.join(LayoutConfig::MIDLET_MANIFEST_FILE))?;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MidletError::NotADirectory(dir.to_path_buf()))?;

        let item = AppItem::new(
            &self.apps_dir,
            name,
            descriptor.name(),
            descriptor.vendor(),
            descriptor.version(),
        )
        .with_image_path(find_icon(dir, &descriptor));

        Ok(item)
    }
}

/// Icon path relative to `dir`: the extracted icon file first, then the
/// descriptor's icon inside the resource directory.
fn find_icon(dir: &Path, descriptor: &Descriptor) -> Option<String> {
    if dir.join(LayoutConfig::MIDLET_ICON_FILE).exists() {
        return Some(LayoutConfig::MIDLET_ICON_FILE.to_string());
    }

    let icon = descriptor.icon()?;
    let relative = format!("{}/{}", LayoutConfig::MIDLET_RES_DIR, icon);
    if dir.join(&relative).exists() {
        Some(relative)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_app(apps_dir: &Path, name: &str, artifact: &str, manifest: Option<&str>) -> PathBuf {
        let dir = apps_dir.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(artifact), b"artifact").unwrap();
        if let Some(manifest) = manifest {
            fs::write(dir.join(LayoutConfig::MIDLET_MANIFEST_FILE), manifest).unwrap();
        }
        dir
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_app() {
        let temp_dir = TempDir::new().unwrap();
        write_app(
            temp_dir.path(),
            "snake",
            LayoutConfig::MIDLET_DEX_ARCH,
            Some("MIDlet-Name: Snake\nMIDlet-Vendor: Nokia\nMIDlet-Version: 1.0\n"),
        );

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["snake"]));
        assert_eq!(report.apps.len(), 1);
        let app = &report.apps[0];
        assert_eq!(app.path(), "snake");
        assert_eq!(app.title(), "Snake");
        assert_eq!(app.author(), "Nokia");
        assert_eq!(app.version(), "1.0");
        assert_eq!(app.image_path(), None);
        assert!(report.purged.is_empty());
    }

    #[test]
    fn test_raw_artifact_is_enough() {
        let temp_dir = TempDir::new().unwrap();
        write_app(
            temp_dir.path(),
            "snake",
            LayoutConfig::MIDLET_DEX_FILE,
            Some("MIDlet-Name: Snake\n"),
        );

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["snake"]));
        assert_eq!(report.apps.len(), 1);
    }

    #[test]
    fn test_missing_artifacts_purges_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = write_app(temp_dir.path(), "broken", "other.bin", Some("MIDlet-Name: X\n"));

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["broken"]));
        assert!(report.apps.is_empty());
        assert_eq!(report.purged, names(&["broken"]));
        assert!(!dir.exists());
    }

    #[test]
    fn test_bad_descriptor_purges_only_that_app() {
        let temp_dir = TempDir::new().unwrap();
        let bad = write_app(temp_dir.path(), "bad", LayoutConfig::MIDLET_DEX_ARCH, None);
        write_app(
            temp_dir.path(),
            "good",
            LayoutConfig::MIDLET_DEX_ARCH,
            Some("MIDlet-Name: Good\n"),
        );

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["bad", "good"]));
        assert_eq!(report.apps.len(), 1);
        assert_eq!(report.apps[0].path(), "good");
        assert!(!bad.exists());
    }

    #[test]
    fn test_stray_file_is_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let stray = temp_dir.path().join("stray.jar");
        fs::write(&stray, b"x").unwrap();

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["stray.jar"]));
        assert!(report.apps.is_empty());
        assert_eq!(report.purged, names(&["stray.jar"]));
        assert!(!stray.exists());
    }

    #[test]
    fn test_vanished_directory_is_not_reported_as_purged() {
        let temp_dir = TempDir::new().unwrap();

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["gone"]));
        assert!(report.apps.is_empty());
        assert!(report.purged.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_undeletable_directory_is_not_reported_as_purged() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = write_app(temp_dir.path(), "locked", "other.bin", None);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(dir.join("write-check"), b"").is_ok() {
            // Running with privileges that ignore permissions.
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["locked"]));
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(report.apps.is_empty());
        assert!(report.purged.is_empty());
        assert!(dir.exists());
    }

    #[test]
    fn test_input_order_preserved() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c", "a", "b"] {
            write_app(
                temp_dir.path(),
                name,
                LayoutConfig::MIDLET_DEX_ARCH,
                Some(&format!("MIDlet-Name: {}\n", name)),
            );
        }

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["c", "a", "b"]));
        let order: Vec<&str> = report.apps.iter().map(|a| a.path()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_icon_file_preferred() {
        let temp_dir = TempDir::new().unwrap();
        let dir = write_app(
            temp_dir.path(),
            "snake",
            LayoutConfig::MIDLET_DEX_ARCH,
            Some("MIDlet-Name: Snake\nMIDlet-Icon: /i.png\n"),
        );
        fs::write(dir.join(LayoutConfig::MIDLET_ICON_FILE), b"png").unwrap();
        fs::create_dir_all(dir.join("res")).unwrap();
        fs::write(dir.join("res/i.png"), b"png").unwrap();

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["snake"]));
        assert_eq!(report.apps[0].image_path(), Some("icon.png"));
    }

    #[test]
    fn test_icon_from_resources() {
        let temp_dir = TempDir::new().unwrap();
        let dir = write_app(
            temp_dir.path(),
            "snake",
            LayoutConfig::MIDLET_DEX_ARCH,
            Some("MIDlet-Name: Snake\nMIDlet-1: Snake, /img/s.png, Snake\n"),
        );
        fs::create_dir_all(dir.join("res/img")).unwrap();
        fs::write(dir.join("res/img/s.png"), b"png").unwrap();

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["snake"]));
        assert_eq!(report.apps[0].image_path(), Some("res/img/s.png"));
        assert_eq!(report.apps[0].image_path_ext(), Some(dir.join("res/img/s.png")));
    }

    #[test]
    fn test_declared_icon_missing_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        write_app(
            temp_dir.path(),
            "snake",
            LayoutConfig::MIDLET_DEX_ARCH,
            Some("MIDlet-Name: Snake\nMIDlet-Icon: /gone.png\n"),
        );

        let report = AppScanner::new(temp_dir.path()).scan(&names(&["snake"]));
        assert_eq!(report.apps[0].image_path(), None);
    }
}
