//! Tolerant `Key: Value` manifest parsing.
//!
//! Lines starting with whitespace continue the value of the last entry, the
//! way long JAR manifest attributes are folded. Lines without a colon are
//! skipped. Reading a manifest never fails: I/O problems are logged and
//! whatever was parsed up to that point is returned.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Ordered attribute map. Keys are unique and keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<(String, String)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute. Overwriting keeps the key's position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Line-by-line manifest builder.
#[derive(Default)]
struct ManifestReader {
    manifest: Manifest,
}

impl ManifestReader {
    fn feed_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.starts_with(char::is_whitespace) {
            let continuation = line.trim();
            if continuation.is_empty() {
                return;
            }
            // Folds into the tail of the ordered map, not the key written last.
            match self.manifest.entries.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(continuation);
                }
                None => warn!("Ignoring manifest continuation line with no attribute before it"),
            }
            return;
        }

        if let Some(index) = line.find(':') {
            if index > 0 {
                self.manifest.insert(line[..index].trim(), line[index + 1..].trim());
            }
        }
    }
}

impl IntoIterator for Manifest {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse manifest text.
pub fn parse_manifest(text: &str) -> Manifest {
    let mut reader = ManifestReader::default();
    for line in text.lines() {
        reader.feed_line(line);
    }
    reader.manifest
}

/// Load a manifest file, degrading to an empty or partial map on failure.
pub fn load_manifest(path: &Path) -> Manifest {
    let mut builder = ManifestReader::default();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(
                "Application properties will not be available, cannot open {}: {}",
                path.display(),
                e
            );
            return builder.manifest;
        }
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                builder.feed_line(line.trim_end_matches('\n'));
            }
            Err(e) => {
                warn!(
                    "Stopped reading {} after {} attributes: {}",
                    path.display(),
                    builder.manifest.len(),
                    e
                );
                break;
            }
        }
    }

    builder.manifest
}
