//! Platform abstraction layer.
//!
//! All `#[cfg]` blocks for OS-specific locations live here rather than being
//! scattered through the scanner and shortcut code.

pub mod paths;

pub use paths::{apps_dir, default_storage_root, launcher_data_dir};
