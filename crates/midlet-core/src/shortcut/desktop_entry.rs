//! `.desktop` files for pinned MIDlet shortcuts.
//!
//! Only the keys a launcher needs to show and start one application are
//! written: type, label, command, icon, categories and the shortcut id.

use std::fs;
use std::path::Path;

use crate::error::{MidletError, Result};
use tracing::debug;

/// Key carrying the shortcut id, so entries can be matched back to an app.
pub const ID_KEY: &str = "X-Midlet-Id";

/// One pinned application shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Menu label, the application title.
    pub name: String,
    pub comment: Option<String>,
    /// Launcher program followed by the app URI, already quoted.
    pub exec: String,
    /// Themed icon name or absolute PNG path.
    pub icon: String,
    pub terminal: bool,
    pub categories: Vec<String>,
    /// Shortcut id written as [`ID_KEY`].
    pub id: Option<String>,
}

impl Default for DesktopEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            comment: None,
            exec: String::new(),
            icon: String::new(),
            terminal: false,
            categories: vec!["Game".to_string(), "Emulator".to_string()],
            id: None,
        }
    }
}

impl DesktopEntry {
    pub fn builder() -> DesktopEntryBuilder {
        DesktopEntryBuilder::default()
    }

    /// File contents, keys in fixed order.
    pub fn render(&self) -> String {
        let mut content = String::from("[Desktop Entry]\n");
        content.push_str("Type=Application\n");
        content.push_str(&format!("Name={}\n", escape_value(&self.name)));

        if let Some(ref comment) = self.comment {
            content.push_str(&format!("Comment={}\n", escape_value(comment)));
        }

        content.push_str(&format!("Exec={}\n", self.exec));
        content.push_str(&format!("Icon={}\n", self.icon));
        content.push_str(&format!("Terminal={}\n", self.terminal));

        if !self.categories.is_empty() {
            content.push_str(&format!("Categories={};\n", self.categories.join(";")));
        }

        if let Some(ref id) = self.id {
            content.push_str(&format!("{}={}\n", ID_KEY, escape_value(id)));
        }

        content
    }

    /// Write the entry, creating the applications directory if needed.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MidletError::io_at("create directory", parent, e))?;
        }

        fs::write(path, self.render())
            .map_err(|e| MidletError::io_at("write desktop file", path, e))?;

        // Launchers only trust executable desktop files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                .map_err(|e| MidletError::io_at("set permissions", path, e))?;
        }

        debug!("Wrote desktop entry {}", path.display());
        Ok(())
    }
}

/// Escape control characters as required for string values.
fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
}

/// Quote one argument of an `Exec` key.
pub fn quote_exec_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "\"'\\><~|&;$*?#()`".contains(c));
    if !needs_quotes {
        return arg.replace('%', "%%");
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' | '`' | '$' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '%' => quoted.push_str("%%"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Builder for [`DesktopEntry`].
#[derive(Debug, Default)]
pub struct DesktopEntryBuilder {
    entry: DesktopEntry,
}

impl DesktopEntryBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.entry.name = name.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.entry.comment = Some(comment.into());
        self
    }

    pub fn exec(mut self, exec: impl Into<String>) -> Self {
        self.entry.exec = exec.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.entry.icon = icon.into();
        self
    }

    pub fn terminal(mut self, terminal: bool) -> Self {
        self.entry.terminal = terminal;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.entry.id = Some(id.into());
        self
    }

    pub fn build(self) -> DesktopEntry {
        self.entry
    }
}
