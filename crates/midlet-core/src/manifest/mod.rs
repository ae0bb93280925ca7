//! Manifest and descriptor parsing.
//!
//! [`load_manifest`] is the tolerant reader used wherever partial metadata is
//! acceptable. [`Descriptor::load`] is the strict variant the scanner uses to
//! decide whether an application directory is valid.

mod descriptor;
mod parser;

pub use descriptor::{
    Descriptor, MidletEntry, MIDLET_ICON, MIDLET_NAME, MIDLET_VENDOR, MIDLET_VERSION,
};
pub use parser::{load_manifest, parse_manifest, Manifest};
