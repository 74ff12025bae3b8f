use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::core::config::{PYPROJECT_FILE, SerializedConfiguration, TOOL_SECTION};
use crate::core::error::{ConfigError, Result};

/// The on-disk shapes a configuration can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Appended as a `[tool.PyCompatibility]` table to an existing `pyproject.toml`.
    PyProject,
    /// A standalone, pretty-printed JSON document with sorted keys.
    Json,
    /// A standalone TOML document.
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file name. Anything but `pyproject.toml`,
    /// `*.json` and `*.toml` is rejected with a `WriteConfigurationError`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.file_name().and_then(|name| name.to_str()) == Some(PYPROJECT_FILE) {
            return Ok(ConfigFormat::PyProject);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::Write(format!(
                "Only `.json` and `.toml` configuration files are supported. \
                 The file you gave has suffix `{}`",
                other.map(|ext| format!(".{ext}")).unwrap_or_default()
            ))),
        }
    }

    /// Renders `config` in this format.
    ///
    /// For `PyProject` this is the section body only, without the table header.
    pub fn render(&self, config: &SerializedConfiguration) -> Result<String> {
        match self {
            ConfigFormat::Json => render_json(config),
            ConfigFormat::Toml | ConfigFormat::PyProject => toml::to_string(config)
                .map_err(|e| ConfigError::Write(format!("Failed to serialize to TOML: {e}"))),
        }
    }

    pub fn write(&self, path: &Path, config: &SerializedConfiguration) -> Result<()> {
        let content = self.render(config)?;
        match self {
            ConfigFormat::PyProject => append_pyproject(path, &content),
            ConfigFormat::Json | ConfigFormat::Toml => fs::write(path, content)
                .map_err(|e| write_error(path, e)),
        }
    }
}

/// Four-space indentation, keys in alphabetical order.
fn render_json(config: &SerializedConfiguration) -> Result<String> {
    // serde_json::Map is ordered by key, so going through a Value sorts the fields.
    let value = serde_json::to_value(config)
        .map_err(|e| ConfigError::Write(format!("Failed to serialize to JSON: {e}")))?;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ConfigError::Write(format!("Failed to serialize to JSON: {e}")))?;

    String::from_utf8(buffer)
        .map_err(|e| ConfigError::Write(format!("Failed to serialize to JSON: {e}")))
}

/// Appends the section to `path`, leaving existing content untouched.
fn append_pyproject(path: &Path, body: &str) -> Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(write_error(path, e)),
    };

    let mut section = String::new();
    if !existing.is_empty() {
        if !existing.replace('\r', "\n").ends_with('\n') {
            section.push('\n');
        }
        section.push('\n');
    }
    section.push_str(&format!("[tool.{TOOL_SECTION}]\n"));
    section.push_str(body);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| write_error(path, e))?;
    file.write_all(section.as_bytes())
        .map_err(|e| write_error(path, e))
}

fn write_error(path: &Path, e: io::Error) -> ConfigError {
    ConfigError::Write(format!("Failed to write {}: {e}", path.display()))
}
