//! Platform-specific path utilities.
//!
//! This module provides functions to get platform-specific paths for:
//! - The default emulator storage root
//! - Application menu/shortcut directories
//! - Launcher data (generated icons, recent shortcut list)

use crate::error::{MidletError, Result};
use std::path::PathBuf;

const STORAGE_DIR_NAME: &str = "J2ME-Loader";

/// Get the default emulator storage root.
///
/// # Platform Behavior
/// - **Linux**: `~/.local/share/J2ME-Loader`
/// - **Windows**: `%APPDATA%\J2ME-Loader`
/// - **macOS**: `~/Library/Application Support/J2ME-Loader`
pub fn default_storage_root() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| MidletError::Config {
        message: "Could not determine data directory".to_string(),
    })?;
    Ok(data_dir.join(STORAGE_DIR_NAME))
}

/// Get the system applications/shortcuts directory.
///
/// # Platform Behavior
/// - **Linux**: `~/.local/share/applications` (XDG spec)
/// - **Windows**: `%APPDATA%/Microsoft/Windows/Start Menu/Programs`
/// - **macOS**: `~/Applications`
pub fn apps_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = dirs::home_dir().ok_or_else(|| MidletError::Config {
            message: "Could not determine home directory".to_string(),
        })?;
        Ok(home.join(".local").join("share").join("applications"))
    }

    #[cfg(target_os = "windows")]
    {
        let data_dir = dirs::data_dir().ok_or_else(|| MidletError::Config {
            message: "Could not determine app data directory".to_string(),
        })?;
        Ok(data_dir
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs"))
    }

    #[cfg(target_os = "macos")]
    {
        let home = dirs::home_dir().ok_or_else(|| MidletError::Config {
            message: "Could not determine home directory".to_string(),
        })?;
        Ok(home.join("Applications"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        Err(MidletError::Config {
            message: "Unsupported platform for apps directory".to_string(),
        })
    }
}

/// Get the directory for launcher-owned data (generated icons, recent list).
pub fn launcher_data_dir() -> Result<PathBuf> {
    Ok(default_storage_root()?.join("launcher-data"))
}
