//! MIDlet Library - Headless library for installed MIDlet applications.
//!
//! This crate keeps a persisted list of installed J2ME applications in step
//! with the application directories on disk, and manages launcher shortcuts
//! for them. It does not convert, install or run applications.
//!
//! # Example
//!
//! ```rust,ignore
//! use midlet_library::{DesktopShortcutPlatform, MidletLibrary};
//! use std::sync::Arc;
//!
//! fn main() -> midlet_library::Result<()> {
//!     let platform = Arc::new(DesktopShortcutPlatform::for_current_user("midlet-loader")?);
//!     let library = MidletLibrary::open("/path/to/J2ME-Loader", platform)?;
//!
//!     let report = library.refresh()?;
//!     println!("{} new, {} removed", report.inserted.len(), report.deleted.len());
//!
//!     for app in library.apps()? {
//!         println!("{} by {}", app.title(), app.author());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_utils;
pub mod library;
pub mod manifest;
pub mod metadata;
pub mod models;
pub mod platform;
pub mod shortcut;
pub mod store;

// Re-export commonly used types
pub use config::StoragePaths;
pub use error::{MidletError, Result};
pub use library::{AppScanner, ReconcileGuard, Reconciler, ScanReport, SyncReport};
pub use manifest::{load_manifest, parse_manifest, Descriptor, Manifest};
pub use models::AppItem;
pub use shortcut::{
    DesktopShortcutPlatform, DynShortcutPlatform, LaunchIntent, ShortcutIcon, ShortcutManager,
    ShortcutPlatform, ShortcutSpec,
};
pub use store::{AppRepository, SqliteAppRepository};

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Main entry point for programmatic access to an application library.
///
/// One instance owns one storage root: the apps directory, the per-app data
/// and config directories, the record database and the reconcile lock.
pub struct MidletLibrary {
    paths: StoragePaths,
    repository: Arc<dyn AppRepository>,
    shortcuts: ShortcutManager,
    reconciler: Reconciler,
}

impl MidletLibrary {
    /// Open the library stored under `root`, creating its layout if needed.
    pub fn open(root: impl Into<PathBuf>, platform: DynShortcutPlatform) -> Result<Self> {
        let paths = StoragePaths::new(root);

        for dir in [paths.apps_dir(), paths.data_dir(), paths.configs_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| MidletError::io_at("create library directory", &dir, e))?;
        }

        let repository: Arc<dyn AppRepository> = Arc::new(SqliteAppRepository::open(
            paths.database_path(),
            paths.apps_dir(),
        )?);
        Ok(Self::with_repository(paths, repository, platform))
    }

    /// Assemble a library over an existing record store.
    pub fn with_repository(
        paths: StoragePaths,
        repository: Arc<dyn AppRepository>,
        platform: DynShortcutPlatform,
    ) -> Self {
        let shortcuts = ShortcutManager::new(platform);
        let reconciler = Reconciler::new(paths.clone(), repository.clone(), shortcuts.clone());
        info!("Opened MIDlet library at {}", paths.root().display());

        Self {
            paths,
            repository,
            shortcuts,
            reconciler,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Reconcile stored records with the apps directory.
    pub fn refresh(&self) -> Result<SyncReport> {
        self.reconciler.refresh()
    }

    /// Stored records, in store order. Call [`refresh`](Self::refresh) first
    /// for an up-to-date view.
    pub fn apps(&self) -> Result<Vec<AppItem>> {
        self.repository.list()
    }

    /// Look up an application by directory name.
    pub fn find_app(&self, path: &str) -> Result<Option<AppItem>> {
        self.repository.get(path)
    }

    fn require_app(&self, path: &str) -> Result<AppItem> {
        self.find_app(path)?.ok_or_else(|| MidletError::AppNotFound {
            path: path.to_string(),
        })
    }

    /// Uninstall an application and everything stored for it.
    pub fn delete_app(&self, path: &str) -> Result<()> {
        let item = self.require_app(path)?;
        self.reconciler.delete_app(&item)?;
        info!("Deleted application {} ({})", item.title(), item.path());
        Ok(())
    }

    /// Request a pinned launcher shortcut for an application.
    pub fn add_shortcut(&self, path: &str) -> Result<()> {
        let item = self.require_app(path)?;
        self.shortcuts.add_shortcut(&item).map_err(|e| {
            warn!("Failed to pin shortcut for {}: {}", item.title(), e);
            e
        })
    }

    /// Record that an application was just started.
    pub fn push_to_recent(&self, path: &str) -> Result<()> {
        let item = self.require_app(path)?;
        self.shortcuts.push_item_to_recent(&item);
        Ok(())
    }

    /// Hold the single-writer lock while writing into the apps directory.
    ///
    /// The lock is not reentrant. While the guard is alive, [`refresh`] and
    /// [`delete_app`] block even on the holding thread; reconcile with
    /// [`refresh_locked`] instead.
    ///
    /// [`refresh`]: Self::refresh
    /// [`delete_app`]: Self::delete_app
    /// [`refresh_locked`]: Self::refresh_locked
    pub fn lock(&self) -> Result<ReconcileGuard<'_>> {
        self.reconciler.lock()
    }

    /// Reconcile while already holding the guard from [`lock`](Self::lock),
    /// e.g. right after an install.
    pub fn refresh_locked(&self, guard: &ReconcileGuard<'_>) -> Result<SyncReport> {
        self.reconciler.refresh_locked(guard)
    }
}
