//! High-level shortcut management.

use super::icon::{launcher_icon, load_icon_bitmap};
use super::{DynShortcutPlatform, LaunchIntent, ShortcutIcon, ShortcutSpec};
use crate::error::Result;
use crate::models::AppItem;
use std::path::Path;
use tracing::{debug, error, info};

/// Translates application records into launcher shortcut requests.
#[derive(Clone)]
pub struct ShortcutManager {
    platform: DynShortcutPlatform,
}

impl ShortcutManager {
    pub fn new(platform: DynShortcutPlatform) -> Self {
        Self { platform }
    }

    /// Request a pinned shortcut for `item`.
    ///
    /// The app icon is center-cropped to a square and scaled to the launcher
    /// icon size; apps without a readable icon get the default icon.
    pub fn add_shortcut(&self, item: &AppItem) -> Result<()> {
        let icon = match load_icon_bitmap(item) {
            Some(bitmap) => {
                ShortcutIcon::Bitmap(launcher_icon(&bitmap, self.platform.launcher_icon_size()))
            }
            None => ShortcutIcon::Default,
        };

        let shortcut = ShortcutSpec {
            id: item.shortcut_id(),
            short_label: item.title().to_string(),
            icon,
            intent: LaunchIntent::for_app(item.path_ext(), item.title()),
        };

        self.platform.request_pin(&shortcut)?;
        info!("Requested pinned shortcut for {}", item.title());
        Ok(())
    }

    /// Push a "recent" shortcut for the app at `app_path`.
    ///
    /// Never fails: a launcher error must not interrupt starting the app.
    pub fn push_to_recent(&self, app_path: &Path, app_name: &str, icon_file: Option<&Path>) {
        let icon = match icon_file {
            Some(path) => ShortcutIcon::File(path.to_path_buf()),
            None => ShortcutIcon::Default,
        };

        let shortcut = ShortcutSpec {
            id: app_path.to_string_lossy().into_owned(),
            short_label: app_name.to_string(),
            icon,
            intent: LaunchIntent::for_app(app_path, app_name),
        };

        match self.platform.push_dynamic(&shortcut) {
            Ok(()) => debug!("Pushed recent shortcut for {}", app_name),
            Err(e) => error!("Failed to push recent shortcut for {}: {}", app_name, e),
        }
    }

    /// Push a "recent" shortcut for an application record.
    pub fn push_item_to_recent(&self, item: &AppItem) {
        let icon = item.image_path_ext().filter(|p| p.is_file());
        self.push_to_recent(item.path_ext(), item.title(), icon.as_deref());
    }

    /// Remove the shortcuts of all `items` in one launcher call.
    pub fn remove_from_recent(&self, items: &[AppItem]) -> Result<()> {
        let ids: Vec<String> = items.iter().map(AppItem::shortcut_id).collect();
        self.remove_ids(&ids)
    }

    /// Remove shortcuts by id in one launcher call.
    pub fn remove_ids(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.platform.remove_dynamic(ids)?;
        debug!("Removed shortcuts for {} apps", ids.len());
        Ok(())
    }
}
