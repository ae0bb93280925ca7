//! Data models shared by the scanner, the record store and the shortcut layer.

mod app;

pub use app::*;
