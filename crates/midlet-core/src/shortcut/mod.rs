//! Launcher shortcuts for installed applications.
//!
//! The launcher itself is an external collaborator behind
//! [`ShortcutPlatform`]. [`ShortcutManager`] turns application records into
//! shortcut requests; [`DesktopShortcutPlatform`] is the XDG desktop backend.

mod desktop;
pub mod desktop_entry;
pub mod icon;
mod manager;

pub use desktop::{DesktopShortcutPlatform, RecentShortcut};
pub use desktop_entry::DesktopEntry;
pub use icon::{launcher_icon, load_icon_bitmap, square_crop_rect, CropRect};
pub use manager::ShortcutManager;

use crate::config::ShortcutConfig;
use crate::error::Result;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Icon attached to a shortcut request.
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutIcon {
    /// The platform's default application icon.
    Default,
    /// A square bitmap already sized for the launcher.
    Bitmap(RgbaImage),
    /// An icon file used as-is.
    File(PathBuf),
}

/// What the launcher runs when the shortcut is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchIntent {
    /// URI of the application directory.
    pub data: String,
    pub extras: BTreeMap<String, String>,
}

impl LaunchIntent {
    /// Intent that opens the application stored at `app_path`.
    pub fn for_app(app_path: &Path, name: &str) -> Self {
        let data = Url::from_file_path(app_path)
            .map(String::from)
            .unwrap_or_else(|_| app_path.to_string_lossy().into_owned());
        let mut extras = BTreeMap::new();
        extras.insert(ShortcutConfig::KEY_MIDLET_NAME.to_string(), name.to_string());
        Self { data, extras }
    }

    pub fn midlet_name(&self) -> Option<&str> {
        self.extras
            .get(ShortcutConfig::KEY_MIDLET_NAME)
            .map(String::as_str)
    }
}

/// A shortcut create/update request.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutSpec {
    /// Stable id: the application's external path.
    pub id: String,
    pub short_label: String,
    pub icon: ShortcutIcon,
    pub intent: LaunchIntent,
}

/// Launcher shortcut collaborator.
pub trait ShortcutPlatform: Send + Sync {
    /// Preferred edge length of launcher icons, in pixels.
    fn launcher_icon_size(&self) -> u32 {
        ShortcutConfig::DEFAULT_LAUNCHER_ICON_SIZE
    }

    /// Ask the launcher to pin a shortcut.
    fn request_pin(&self, shortcut: &ShortcutSpec) -> Result<()>;

    /// Add or refresh a dynamic ("recent") shortcut.
    fn push_dynamic(&self, shortcut: &ShortcutSpec) -> Result<()>;

    /// Remove dynamic and pinned shortcuts with the given ids.
    fn remove_dynamic(&self, ids: &[String]) -> Result<()>;
}

/// Shared handle to a shortcut backend.
pub type DynShortcutPlatform = Arc<dyn ShortcutPlatform>;
