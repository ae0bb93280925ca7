//! Reconciliation of stored records with the apps directory.

use super::lock::{ReconcileGuard, ReconcileLock};
use super::scanner::AppScanner;
use crate::config::StoragePaths;
use crate::error::{MidletError, Result};
use crate::file_utils::{child_path, delete_directory, list_dir_names};
use crate::models::AppItem;
use crate::shortcut::ShortcutManager;
use crate::store::AppRepository;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a reconciliation pass changed, by directory name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: Vec<String>,
    pub deleted: Vec<String>,
    pub purged: Vec<String>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty() && self.purged.is_empty()
    }
}

/// Keeps the record store in step with the apps directory.
pub struct Reconciler {
    paths: StoragePaths,
    scanner: AppScanner,
    repository: Arc<dyn AppRepository>,
    shortcuts: ShortcutManager,
    lock: ReconcileLock,
}

impl Reconciler {
    pub fn new(
        paths: StoragePaths,
        repository: Arc<dyn AppRepository>,
        shortcuts: ShortcutManager,
    ) -> Self {
        Self {
            scanner: AppScanner::new(paths.apps_dir()),
            lock: ReconcileLock::new(paths.lock_path()),
            paths,
            repository,
            shortcuts,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Hold the single-writer lock, e.g. while an installer writes into the
    /// apps root.
    ///
    /// The lock is not reentrant: while the guard is alive, [`refresh`],
    /// [`update_db`] and [`delete_app`] block, also on this thread. Use
    /// [`refresh_locked`] to reconcile under a guard already held.
    ///
    /// [`refresh`]: Self::refresh
    /// [`update_db`]: Self::update_db
    /// [`delete_app`]: Self::delete_app
    /// [`refresh_locked`]: Self::refresh_locked
    pub fn lock(&self) -> Result<ReconcileGuard<'_>> {
        self.lock.acquire()
    }

    /// Reconcile against the records currently in the store.
    pub fn refresh(&self) -> Result<SyncReport> {
        let guard = self.lock.acquire()?;
        self.refresh_locked(&guard)
    }

    /// [`refresh`](Self::refresh) under a guard obtained from
    /// [`lock`](Self::lock).
    pub fn refresh_locked(&self, guard: &ReconcileGuard<'_>) -> Result<SyncReport> {
        let items = self.repository.list()?;
        self.update_db_locked(guard, items)
    }

    /// Reconcile `items` (the stored records, in store order) with the
    /// directories present on disk.
    pub fn update_db(&self, items: Vec<AppItem>) -> Result<SyncReport> {
        let guard = self.lock.acquire()?;
        self.update_db_locked(&guard, items)
    }

    /// [`update_db`](Self::update_db) under a guard obtained from
    /// [`lock`](Self::lock).
    pub fn update_db_locked(
        &self,
        guard: &ReconcileGuard<'_>,
        items: Vec<AppItem>,
    ) -> Result<SyncReport> {
        if !guard.is_for(&self.lock) {
            return Err(MidletError::LockFailed {
                path: self.lock.path().to_path_buf(),
                message: "guard belongs to a different library".to_string(),
            });
        }
        self.reconcile(items)
    }

    fn reconcile(&self, mut items: Vec<AppItem>) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        // An unfinished install is rolled back, never resumed.
        let tmp_dir = self.paths.tmp_dir();
        if tmp_dir.exists() {
            info!("Removing incomplete installation at {}", tmp_dir.display());
            delete_directory(&tmp_dir);
        }

        let mut app_folders = list_dir_names(&self.paths.apps_dir());
        if app_folders.is_empty() {
            if !items.is_empty() {
                self.repository.delete_all()?;
                self.remove_shortcuts(&items);
                report.deleted = items.iter().map(|i| i.path().to_string()).collect();
                info!("Apps directory is empty, removed {} records", items.len());
            }
            return Ok(report);
        }

        // Records whose directory still exists stay as they are.
        let mut index = items.len();
        while index > 0 {
            index -= 1;
            if let Some(pos) = app_folders.iter().position(|name| name == items[index].path()) {
                app_folders.remove(pos);
                items.remove(index);
            }
        }

        if !items.is_empty() {
            self.repository.delete(&items)?;
            self.remove_shortcuts(&items);
            report.deleted = items.iter().map(|i| i.path().to_string()).collect();
        }

        if !app_folders.is_empty() {
            let scan = self.scanner.scan(&app_folders);
            self.repository.insert(&scan.apps)?;
            report.inserted = scan.apps.iter().map(|i| i.path().to_string()).collect();
            report.purged = scan.purged;
        }

        info!(
            "Reconciled apps: {} inserted, {} deleted, {} purged",
            report.inserted.len(),
            report.deleted.len(),
            report.purged.len()
        );
        Ok(report)
    }

    /// Uninstall an application: its files, save data, settings, record and
    /// shortcuts.
    pub fn delete_app(&self, item: &AppItem) -> Result<()> {
        let _guard = self.lock.acquire()?;

        delete_directory(item.path_ext());
        for base in [self.paths.data_dir(), self.paths.configs_dir()] {
            if let Some(dir) = child_path(&base, item.path()) {
                delete_directory(&dir);
            }
        }

        self.repository.delete(std::slice::from_ref(item))?;
        self.remove_shortcuts(std::slice::from_ref(item));
        debug!("Deleted application {}", item.path());
        Ok(())
    }

    fn remove_shortcuts(&self, items: &[AppItem]) {
        if let Err(e) = self.shortcuts.remove_from_recent(items) {
            warn!("Failed to remove shortcuts for {} apps: {}", items.len(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::shortcut::{ShortcutPlatform, ShortcutSpec};
    use crate::store::SqliteAppRepository;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        removed: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl ShortcutPlatform for Recorder {
        fn request_pin(&self, _shortcut: &ShortcutSpec) -> Result<()> {
            Ok(())
        }

        fn push_dynamic(&self, _shortcut: &ShortcutSpec) -> Result<()> {
            Ok(())
        }

        fn remove_dynamic(&self, ids: &[String]) -> Result<()> {
            if self.fail {
                return Err(MidletError::Shortcut {
                    message: "launcher gone".into(),
                });
            }
            self.removed.lock().unwrap().push(ids.to_vec());
            Ok(())
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        paths: StoragePaths,
        repository: Arc<SqliteAppRepository>,
        recorder: Arc<Recorder>,
        reconciler: Reconciler,
    }

    fn fixture_with(recorder: Recorder) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp_dir.path());
        fs::create_dir_all(paths.apps_dir()).unwrap();
        let repository =
            Arc::new(SqliteAppRepository::open(paths.database_path(), paths.apps_dir()).unwrap());
        let recorder = Arc::new(recorder);
        let reconciler = Reconciler::new(
            paths.clone(),
            repository.clone(),
            ShortcutManager::new(recorder.clone()),
        );
        Fixture {
            _temp_dir: temp_dir,
            paths,
            repository,
            recorder,
            reconciler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Recorder::default())
    }

    fn install(apps_dir: &Path, name: &str) {
        let dir = apps_dir.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LayoutConfig::MIDLET_DEX_ARCH), b"jar").unwrap();
        fs::write(
            dir.join(LayoutConfig::MIDLET_MANIFEST_FILE),
            format!("MIDlet-Name: {}\nMIDlet-Vendor: Test\n", name),
        )
        .unwrap();
    }

    fn stored(f: &Fixture) -> Vec<String> {
        let mut names: Vec<String> = f
            .repository
            .list()
            .unwrap()
            .into_iter()
            .map(|i| i.path().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_discovers_new_apps() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        install(&f.paths.apps_dir(), "b");

        let report = f.reconciler.refresh().unwrap();
        let mut inserted = report.inserted.clone();
        inserted.sort();
        assert_eq!(inserted, vec!["a", "b"]);
        assert_eq!(stored(&f), vec!["a", "b"]);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        f.reconciler.refresh().unwrap();

        let report = f.reconciler.refresh().unwrap();
        assert!(report.is_noop());
        assert_eq!(stored(&f), vec!["a"]);
        assert!(f.recorder.removed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_removed_directory_deletes_record_and_shortcut() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        install(&f.paths.apps_dir(), "b");
        install(&f.paths.apps_dir(), "c");
        f.reconciler.refresh().unwrap();

        fs::remove_dir_all(f.paths.app_dir("a")).unwrap();
        fs::remove_dir_all(f.paths.app_dir("c")).unwrap();
        let report = f.reconciler.refresh().unwrap();

        let mut deleted = report.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a", "c"]);
        assert_eq!(stored(&f), vec!["b"]);

        let removed = f.recorder.removed.lock().unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].len(), 2);
    }

    #[test]
    fn test_empty_apps_dir_clears_store() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        f.reconciler.refresh().unwrap();

        fs::remove_dir_all(f.paths.app_dir("a")).unwrap();
        let report = f.reconciler.refresh().unwrap();

        assert_eq!(report.deleted, vec!["a"]);
        assert!(stored(&f).is_empty());
        assert_eq!(f.recorder.removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_apps_dir_with_empty_store() {
        let f = fixture();
        fs::remove_dir_all(f.paths.apps_dir()).unwrap();

        let report = f.reconciler.refresh().unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_incomplete_install_is_rolled_back() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        fs::create_dir_all(f.paths.tmp_dir().join("partial")).unwrap();
        fs::write(f.paths.tmp_dir().join("partial/converted.jar"), b"half").unwrap();

        let report = f.reconciler.refresh().unwrap();
        assert!(!f.paths.tmp_dir().exists());
        assert_eq!(report.inserted, vec!["a"]);
        assert!(report.purged.is_empty());
    }

    #[test]
    fn test_corrupt_directory_is_purged() {
        let f = fixture();
        install(&f.paths.apps_dir(), "good");
        fs::create_dir_all(f.paths.app_dir("empty")).unwrap();

        let report = f.reconciler.refresh().unwrap();
        assert_eq!(report.inserted, vec!["good"]);
        assert_eq!(report.purged, vec!["empty"]);
        assert!(!f.paths.app_dir("empty").exists());
    }

    #[test]
    fn test_update_db_with_explicit_items() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        f.reconciler.refresh().unwrap();
        let items = f.repository.list().unwrap();

        let report = f.reconciler.update_db(items).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_shortcut_failure_does_not_abort_sync() {
        let f = fixture_with(Recorder {
            fail: true,
            ..Default::default()
        });
        install(&f.paths.apps_dir(), "a");
        install(&f.paths.apps_dir(), "b");
        f.reconciler.refresh().unwrap();

        fs::remove_dir_all(f.paths.app_dir("a")).unwrap();
        let report = f.reconciler.refresh().unwrap();
        assert_eq!(report.deleted, vec!["a"]);
        assert_eq!(stored(&f), vec!["b"]);
    }

    #[test]
    fn test_delete_app_removes_everything() {
        let f = fixture();
        install(&f.paths.apps_dir(), "a");
        f.reconciler.refresh().unwrap();
        let data = f.paths.data_dir().join("a");
        let configs = f.paths.configs_dir().join("a");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&configs).unwrap();
        fs::write(data.join("save.rms"), b"score").unwrap();

        let item = f.repository.get("a").unwrap().unwrap();
        f.reconciler.delete_app(&item).unwrap();

        assert!(!f.paths.app_dir("a").exists());
        assert!(!data.exists());
        assert!(!configs.exists());
        assert!(stored(&f).is_empty());
        assert_eq!(
            f.recorder.removed.lock().unwrap()[0],
            vec![item.shortcut_id()]
        );
    }

    #[test]
    fn test_refresh_under_held_guard() {
        let f = fixture();
        let guard = f.reconciler.lock().unwrap();
        install(&f.paths.apps_dir(), "a");

        let report = f.reconciler.refresh_locked(&guard).unwrap();
        assert_eq!(report.inserted, vec!["a"]);
        drop(guard);
        assert!(f.reconciler.refresh().unwrap().is_noop());
    }

    #[test]
    fn test_foreign_guard_is_rejected() {
        let f = fixture();
        let other = fixture();
        let guard = other.reconciler.lock().unwrap();

        let err = f.reconciler.refresh_locked(&guard).unwrap_err();
        assert!(matches!(err, MidletError::LockFailed { .. }));
        let err = f.reconciler.update_db_locked(&guard, Vec::new()).unwrap_err();
        assert!(matches!(err, MidletError::LockFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_directory_is_left_alone() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let f = fixture();
        install(&f.paths.apps_dir(), "snake");
        let raw = f.paths.apps_dir().join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join(LayoutConfig::MIDLET_DEX_ARCH), b"jar").unwrap();
        fs::write(raw.join(LayoutConfig::MIDLET_MANIFEST_FILE), "MIDlet-Name: Cafe\n").unwrap();

        let first = f.reconciler.refresh().unwrap();
        assert_eq!(first.inserted, vec!["snake"]);
        assert!(first.purged.is_empty());

        let second = f.reconciler.refresh().unwrap();
        assert!(second.is_noop());
        assert_eq!(stored(&f), vec!["snake"]);
        assert!(raw.is_dir());
    }

    #[test]
    fn test_sync_waits_for_installer_lock() {
        let f = fixture();
        let guard = f.reconciler.lock().unwrap();
        assert!(f.reconciler.lock.try_acquire().unwrap().is_none());
        drop(guard);
        assert!(f.reconciler.refresh().is_ok());
    }
}
