//! Centralized configuration for the MIDlet library.
//!
//! Constant groups for the on-disk layout, the record database and launcher
//! shortcuts, plus [`StoragePaths`], the resolved set of directories every
//! component receives at construction time.

use std::path::{Path, PathBuf};

/// On-disk layout of the emulator root and of each application directory.
pub struct LayoutConfig;

impl LayoutConfig {
    pub const APPS_DIR_NAME: &'static str = "converted";
    pub const DATA_DIR_NAME: &'static str = "data";
    pub const CONFIGS_DIR_NAME: &'static str = "configs";
    /// Staging directory of an install that has not finished yet.
    pub const TMP_DIR_NAME: &'static str = ".tmp";

    pub const MIDLET_DEX_FILE: &'static str = "converted.dex";
    pub const MIDLET_DEX_ARCH: &'static str = "converted.jar";
    pub const MIDLET_MANIFEST_FILE: &'static str = "converted.dex.conf";
    pub const MIDLET_ICON_FILE: &'static str = "icon.png";
    pub const MIDLET_RES_DIR: &'static str = "res";

    pub const DATABASE_FILE: &'static str = "apps.db";
    pub const LOCK_FILE: &'static str = ".reconcile.lock";
}

/// Record database settings.
pub struct DatabaseConfig;

impl DatabaseConfig {
    pub const BUSY_TIMEOUT_MS: u32 = 5000;
}

/// Launcher shortcut settings.
pub struct ShortcutConfig;

impl ShortcutConfig {
    pub const DEFAULT_ICON_NAME: &'static str = "midlet-loader";
    pub const DEFAULT_LAUNCHER_ICON_SIZE: u32 = 192;
    pub const MAX_RECENT_SHORTCUTS: usize = 4;
    pub const KEY_MIDLET_NAME: &'static str = "midletName";
    pub const DESKTOP_FILE_PREFIX: &'static str = "midlet-";
    pub const RECENT_FILE_NAME: &'static str = "recent-shortcuts.json";
    pub const ICONS_DIR_NAME: &'static str = "icons";
}

/// Resolved storage locations under one emulator root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per installed application.
    pub fn apps_dir(&self) -> PathBuf {
        self.root.join(LayoutConfig::APPS_DIR_NAME)
    }

    /// Per-application save data (`<data>/<app>`).
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(LayoutConfig::DATA_DIR_NAME)
    }

    /// Per-application emulator settings (`<configs>/<app>`).
    pub fn configs_dir(&self) -> PathBuf {
        self.root.join(LayoutConfig::CONFIGS_DIR_NAME)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.apps_dir().join(LayoutConfig::TMP_DIR_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(LayoutConfig::DATABASE_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LayoutConfig::LOCK_FILE)
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.apps_dir().join(name)
    }
}
