//! Small JSON state files owned by the launcher side of the library.

pub mod atomic;

pub use atomic::{atomic_read_json, atomic_write_json};
