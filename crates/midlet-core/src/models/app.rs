use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An installed application, as discovered in the apps directory.
///
/// Identity is the directory name (`path`). Records are never edited in
/// place: a re-scan builds a new one and the store replaces the old row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppItem {
    path: String,
    title: String,
    author: String,
    version: String,
    image_path: Option<String>,
    path_ext: PathBuf,
}

impl AppItem {
    /// Create a record for the application stored in `apps_dir/path`.
    pub fn new(
        apps_dir: &Path,
        path: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let path_ext = apps_dir.join(&path);
        Self {
            path,
            title: title.into(),
            author: author.into(),
            version: version.into(),
            image_path: None,
            path_ext,
        }
    }

    /// Attach an icon path relative to the application directory.
    pub fn with_image_path(mut self, image_path: Option<String>) -> Self {
        self.image_path = image_path;
        self
    }

    /// Directory name under the apps root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Icon path relative to the application directory.
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// Absolute icon path, if the application has one.
    pub fn image_path_ext(&self) -> Option<PathBuf> {
        self.image_path.as_ref().map(|p| self.path_ext.join(p))
    }

    /// Full path of the application directory. Also the shortcut id.
    pub fn path_ext(&self) -> &Path {
        &self.path_ext
    }

    /// Stable launcher shortcut id.
    pub fn shortcut_id(&self) -> String {
        self.path_ext.to_string_lossy().into_owned()
    }
}
