//! XDG desktop shortcut backend.
//!
//! Pinned shortcuts become `.desktop` files in the applications directory.
//! Desktops have no notion of dynamic shortcuts, so "recent" shortcuts are
//! kept as a short most-recent-first JSON list that a launcher menu can read.

use super::desktop_entry::{quote_exec_arg, DesktopEntry};
use super::{ShortcutIcon, ShortcutPlatform, ShortcutSpec};
use crate::config::ShortcutConfig;
use crate::error::{MidletError, Result};
use crate::metadata::{atomic_read_json, atomic_write_json};
use crate::platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// One entry of the recent shortcut list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentShortcut {
    pub id: String,
    pub label: String,
    pub uri: String,
    pub icon: Option<PathBuf>,
    pub pushed_at: DateTime<Utc>,
}

/// [`ShortcutPlatform`] for freedesktop launchers.
pub struct DesktopShortcutPlatform {
    /// Where pinned `.desktop` files go (~/.local/share/applications).
    apps_dir: PathBuf,
    /// Generated icons and the recent list.
    data_dir: PathBuf,
    /// Program the shortcuts run, given the app URI as its only argument.
    launcher_command: String,
    icon_size: u32,
    max_recent: usize,
    recent_lock: Mutex<()>,
}

impl DesktopShortcutPlatform {
    pub fn new(
        apps_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        launcher_command: impl Into<String>,
    ) -> Self {
        Self {
            apps_dir: apps_dir.into(),
            data_dir: data_dir.into(),
            launcher_command: launcher_command.into(),
            icon_size: ShortcutConfig::DEFAULT_LAUNCHER_ICON_SIZE,
            max_recent: ShortcutConfig::MAX_RECENT_SHORTCUTS,
            recent_lock: Mutex::new(()),
        }
    }

    /// Backend writing to the current user's platform directories.
    pub fn for_current_user(launcher_command: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            platform::apps_dir()?,
            platform::launcher_data_dir()?,
            launcher_command,
        ))
    }

    pub fn with_icon_size(mut self, size: u32) -> Self {
        self.icon_size = size;
        self
    }

    pub fn with_max_recent(mut self, max_recent: usize) -> Self {
        self.max_recent = max_recent;
        self
    }

    /// File name stem shared by a shortcut's desktop file and generated icon.
    fn stem(id: &str) -> String {
        let hash = blake3::hash(id.as_bytes()).to_hex();
        format!("{}{}", ShortcutConfig::DESKTOP_FILE_PREFIX, &hash.as_str()[..16])
    }

    /// Path of the pinned desktop file for `id`.
    pub fn desktop_file_path(&self, id: &str) -> PathBuf {
        self.apps_dir.join(format!("{}.desktop", Self::stem(id)))
    }

    fn icons_dir(&self) -> PathBuf {
        self.data_dir.join(ShortcutConfig::ICONS_DIR_NAME)
    }

    fn generated_icon_path(&self, id: &str) -> PathBuf {
        self.icons_dir().join(format!("{}.png", Self::stem(id)))
    }

    fn recent_path(&self) -> PathBuf {
        self.data_dir.join(ShortcutConfig::RECENT_FILE_NAME)
    }

    /// Materialize a shortcut icon. `None` means the default icon.
    fn resolve_icon(&self, shortcut: &ShortcutSpec) -> Result<Option<PathBuf>> {
        match &shortcut.icon {
            ShortcutIcon::Default => Ok(None),
            ShortcutIcon::File(path) => Ok(Some(path.clone())),
            ShortcutIcon::Bitmap(bitmap) => {
                let dir = self.icons_dir();
                fs::create_dir_all(&dir)
                    .map_err(|e| MidletError::io_at("create icons directory", &dir, e))?;
                let path = self.generated_icon_path(&shortcut.id);
                bitmap.save_with_format(&path, image::ImageFormat::Png)?;
                debug!("Saved shortcut icon {}", path.display());
                Ok(Some(path))
            }
        }
    }

    /// The recent shortcut list, most recent first.
    pub fn recent(&self) -> Result<Vec<RecentShortcut>> {
        Ok(atomic_read_json(&self.recent_path())?.unwrap_or_default())
    }

    fn load_recent_or_reset(&self) -> Vec<RecentShortcut> {
        match self.recent() {
            Ok(list) => list,
            Err(e) => {
                warn!("Discarding unreadable recent shortcut list: {}", e);
                Vec::new()
            }
        }
    }
}

impl ShortcutPlatform for DesktopShortcutPlatform {
    fn launcher_icon_size(&self) -> u32 {
        self.icon_size
    }

    fn request_pin(&self, shortcut: &ShortcutSpec) -> Result<()> {
        let icon = self
            .resolve_icon(shortcut)?
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ShortcutConfig::DEFAULT_ICON_NAME.to_string());

        let entry = DesktopEntry::builder()
            .name(shortcut.short_label.as_str())
            .comment(format!("Launch {}", shortcut.short_label))
            .exec(format!(
                "{} {}",
                quote_exec_arg(&self.launcher_command),
                quote_exec_arg(&shortcut.intent.data)
            ))
            .icon(icon)
            .terminal(false)
            .id(shortcut.id.as_str())
            .build();

        let path = self.desktop_file_path(&shortcut.id);
        entry.write_to_file(&path)?;
        info!("Pinned shortcut {} at {}", shortcut.short_label, path.display());
        Ok(())
    }

    fn push_dynamic(&self, shortcut: &ShortcutSpec) -> Result<()> {
        let _guard = self.recent_lock.lock().map_err(|_| MidletError::Shortcut {
            message: "Recent shortcut list lock poisoned".to_string(),
        })?;

        let icon = self.resolve_icon(shortcut)?;
        let mut list = self.load_recent_or_reset();
        list.retain(|r| r.id != shortcut.id);
        list.insert(
            0,
            RecentShortcut {
                id: shortcut.id.clone(),
                label: shortcut.short_label.clone(),
                uri: shortcut.intent.data.clone(),
                icon,
                pushed_at: Utc::now(),
            },
        );
        list.truncate(self.max_recent);

        atomic_write_json(&self.recent_path(), &list)
    }

    fn remove_dynamic(&self, ids: &[String]) -> Result<()> {
        let _guard = self.recent_lock.lock().map_err(|_| MidletError::Shortcut {
            message: "Recent shortcut list lock poisoned".to_string(),
        })?;

        let mut list = self.load_recent_or_reset();
        let before = list.len();
        list.retain(|r| !ids.contains(&r.id));
        if list.len() != before {
            atomic_write_json(&self.recent_path(), &list)?;
        }

        for id in ids {
            remove_if_exists(&self.desktop_file_path(id));
            remove_if_exists(&self.generated_icon_path(id));
        }

        debug!("Removed shortcuts for {} ids", ids.len());
        Ok(())
    }
}

fn remove_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
