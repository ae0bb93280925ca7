//! Application descriptor: the validated view over a MIDlet manifest.

use super::parser::{parse_manifest, Manifest};
use crate::error::{MidletError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MIDLET_NAME: &str = "MIDlet-Name";
pub const MIDLET_VENDOR: &str = "MIDlet-Vendor";
pub const MIDLET_VERSION: &str = "MIDlet-Version";
pub const MIDLET_ICON: &str = "MIDlet-Icon";
const MIDLET_ENTRY_PREFIX: &str = "MIDlet-";

/// One `MIDlet-<n>: name, icon, class` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidletEntry {
    pub number: u32,
    pub name: String,
    pub icon: Option<String>,
    pub class_name: String,
}

/// Parsed application descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    path: PathBuf,
    attributes: Manifest,
}

impl Descriptor {
    /// Load and validate a descriptor file.
    ///
    /// Unlike [`super::load_manifest`], this fails when the file cannot be
    /// read or does not describe an application.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| MidletError::io_at("read descriptor", path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        Self::from_manifest(path, parse_manifest(&text))
    }

    /// Validate already parsed attributes.
    pub fn from_manifest(path: impl Into<PathBuf>, attributes: Manifest) -> Result<Self> {
        let path = path.into();
        if attributes.is_empty() {
            return Err(MidletError::DescriptorInvalid {
                path,
                message: "no attributes".to_string(),
            });
        }
        if attributes.get(MIDLET_NAME).map_or(true, str::is_empty) {
            return Err(MidletError::DescriptorInvalid {
                path,
                message: format!("missing {}", MIDLET_NAME),
            });
        }
        debug!("Loaded descriptor {} ({} attributes)", path.display(), attributes.len());
        Ok(Self { path, attributes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Manifest {
        &self.attributes
    }

    pub fn name(&self) -> &str {
        self.get(MIDLET_NAME).unwrap_or_default()
    }

    pub fn vendor(&self) -> &str {
        self.get(MIDLET_VENDOR).unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.get(MIDLET_VERSION).unwrap_or_default()
    }

    /// Icon resource path, relative to the JAR root.
    ///
    /// `MIDlet-Icon` wins; otherwise the icon of the first MIDlet entry.
    pub fn icon(&self) -> Option<String> {
        let icon = match self.get(MIDLET_ICON).filter(|s| !s.trim().is_empty()) {
            Some(icon) => Some(icon.to_string()),
            None => self
                .midlets()
                .into_iter()
                .find(|m| m.number == 1)
                .and_then(|m| m.icon),
        };
        icon.map(|i| i.trim().trim_start_matches('/').to_string())
            .filter(|i| !i.is_empty())
    }

    /// All `MIDlet-<n>` entries, ordered by number.
    pub fn midlets(&self) -> Vec<MidletEntry> {
        let mut midlets: Vec<MidletEntry> = self
            .attributes
            .iter()
            .filter_map(|(key, value)| {
                let number = key.strip_prefix(MIDLET_ENTRY_PREFIX)?.parse::<u32>().ok()?;
                parse_midlet_entry(number, value)
            })
            .collect();
        midlets.sort_by_key(|m| m.number);
        midlets
    }
}

fn parse_midlet_entry(number: u32, value: &str) -> Option<MidletEntry> {
    let mut fields = value.splitn(3, ',').map(str::trim);
    let name = fields.next()?.to_string();
    let icon = fields.next().filter(|s| !s.is_empty()).map(str::to_string);
    let class_name = fields.next().unwrap_or_default().to_string();
    Some(MidletEntry {
        number,
        name,
        icon,
        class_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn descriptor(text: &str) -> Result<Descriptor> {
        Descriptor::from_manifest("converted.dex.conf", parse_manifest(text))
    }

    #[test]
    fn test_basic_fields() {
        let d = descriptor(concat!(
            "MIDlet-Name: Snake\n",
            "MIDlet-Vendor: Nokia\n",
            "MIDlet-Version: 1.2\n",
            "MIDlet-Icon: /icon.png\n",
        ))
        .unwrap();
        assert_eq!(d.name(), "Snake");
        assert_eq!(d.vendor(), "Nokia");
        assert_eq!(d.version(), "1.2");
        assert_eq!(d.icon().as_deref(), Some("icon.png"));
    }

    #[test]
    fn test_icon_falls_back_to_first_midlet() {
        let d = descriptor(concat!(
            "MIDlet-Name: Snake\n",
            "MIDlet-2: Other, /b.png, b.Main\n",
            "MIDlet-1: Snake, /img/a.png, a.Main\n",
        ))
        .unwrap();
        assert_eq!(d.icon().as_deref(), Some("img/a.png"));
    }

    #[test]
    fn test_blank_icon_is_none() {
        let d =
            descriptor("MIDlet-Name: Snake\nMIDlet-Icon:\nMIDlet-1: Snake, , a.Main\n").unwrap();
        assert_eq!(d.icon(), None);
    }

    #[test]
    fn test_midlets_sorted() {
        let d = descriptor(concat!(
            "MIDlet-Name: Pack\n",
            "MIDlet-2: Two, , two.Main\n",
            "MIDlet-1: One, /1.png, one.Main\n",
            "MIDlet-Jar-URL: x.jar\n",
        ))
        .unwrap();
        let midlets = d.midlets();
        assert_eq!(midlets.len(), 2);
        assert_eq!(midlets[0].name, "One");
        assert_eq!(midlets[0].class_name, "one.Main");
        assert_eq!(midlets[1].icon, None);
    }

    #[test]
    fn test_empty_manifest_is_invalid() {
        let err = descriptor("").unwrap_err();
        assert!(matches!(err, MidletError::DescriptorInvalid { .. }));
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let err = descriptor("MIDlet-Vendor: Nokia\n").unwrap_err();
        assert!(matches!(err, MidletError::DescriptorInvalid { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Descriptor::load(&temp_dir.path().join("converted.dex.conf")).unwrap_err();
        assert!(matches!(err, MidletError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("converted.dex.conf");
        std::fs::write(&path, "MIDlet-Name: Bounce\nMIDlet-Vendor: Nokia\n").unwrap();

        let d = Descriptor::load(&path).unwrap();
        assert_eq!(d.name(), "Bounce");
        assert_eq!(d.path(), path.as_path());
    }
}
