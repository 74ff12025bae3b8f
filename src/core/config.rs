use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::resolver::{FileSystemResolver, PathResolver};
use crate::builders::validator::{ConfigValidator, StandardValidator};
use crate::builders::writer::ConfigFormat;
use crate::core::error::{self, ConfigError, ConfigErrorKind, ConfigWarning, Result};

/// Configuration file looked up first by [`CheckConfiguration::discover`].
pub const JSON_CONFIG_FILE: &str = "Compat.json";
/// Project file whose `[tool.PyCompatibility]` table carries the configuration.
pub const PYPROJECT_FILE: &str = "pyproject.toml";
/// Name of the table under `tool` in `pyproject.toml`.
pub const TOOL_SECTION: &str = "PyCompatibility";

const LOGGER: &str = "configuration";

/// The settings for one compatibility check.
///
/// Before [`check_and_resolve`](Self::check_and_resolve) the paths are exactly what the
/// user wrote: relative or absolute, files or directories. Afterwards both version
/// bounds are present, `include` holds canonical file paths and `exclude` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConfiguration {
    min_version: Option<u32>,
    max_version: Option<u32>,
    report: Option<PathBuf>,
    include: BTreeSet<PathBuf>,
    exclude: BTreeSet<PathBuf>,
}

/// Plain projection of a [`CheckConfiguration`], as written to disk.
///
/// Absent values are skipped on output so no `null` or placeholder literal is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SerializedConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
    pub include: BTreeSet<PathBuf>,
    pub exclude: BTreeSet<PathBuf>,
}

/// The schema every configuration source is read through.
///
/// Keys outside this struct are reported by `serde_ignored` instead of being rejected.
#[derive(Debug, Default, Deserialize)]
struct RawCheckConfiguration {
    #[serde(default)]
    min_version: Option<VersionBound>,
    #[serde(default)]
    max_version: Option<VersionBound>,
    #[serde(default)]
    version: Option<Vec<VersionBound>>,
    #[serde(default)]
    report: Option<PathBuf>,
    #[serde(default)]
    include: Option<Vec<PathBuf>>,
    #[serde(default)]
    exclude: Option<Vec<PathBuf>>,
}

/// A version bound as written by the user: `8`, `8.0` or `"8"`.
///
/// `Other` catches every remaining JSON/TOML value so a bad bound is reported
/// against its field instead of failing inside serde.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VersionBound {
    Integer(u32),
    Float(f64),
    Text(String),
    Other(Value),
}

impl VersionBound {
    fn coerce(self, field: &str) -> Result<u32> {
        let invalid = |got: String| {
            ConfigError::Parse(format!(
                "`{field}` should be a non-negative integer, got `{got}`"
            ))
        };
        match self {
            VersionBound::Integer(value) => Ok(value),
            VersionBound::Float(value) => {
                if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
                    Ok(value as u32)
                } else {
                    Err(invalid(value.to_string()))
                }
            }
            VersionBound::Text(text) => text.trim().parse::<u32>().map_err(|_| invalid(text)),
            VersionBound::Other(value) => Err(invalid(value.to_string())),
        }
    }
}

impl CheckConfiguration {
    pub fn new(
        min_version: Option<u32>,
        max_version: Option<u32>,
        report: Option<PathBuf>,
        include: BTreeSet<PathBuf>,
        exclude: BTreeSet<PathBuf>,
    ) -> Self {
        Self {
            min_version,
            max_version,
            report,
            include,
            exclude,
        }
    }

    pub fn min_version(&self) -> Option<u32> {
        self.min_version
    }

    pub fn max_version(&self) -> Option<u32> {
        self.max_version
    }

    pub fn report(&self) -> Option<&Path> {
        self.report.as_deref()
    }

    pub fn include(&self) -> &BTreeSet<PathBuf> {
        &self.include
    }

    pub fn exclude(&self) -> &BTreeSet<PathBuf> {
        &self.exclude
    }

    /// Builds a configuration from a parsed key-value mapping.
    ///
    /// Unknown keys are logged as an `UnusedConfigurationWarning` and otherwise ignored.
    pub fn from_dict(dict_config: Map<String, Value>) -> Result<Self> {
        let (configuration, warning) = Self::from_dict_with_warnings(dict_config)?;
        if let Some(warning) = warning {
            error::warn(&warning, Some(LOGGER));
        }
        Ok(configuration)
    }

    /// Same as [`from_dict`](Self::from_dict), but hands the unused-key warning back
    /// to the caller instead of logging it.
    ///
    /// `version = [min, max]` fills in whichever bound is missing. No defaults are
    /// invented for anything else, and no cross-field checks happen here.
    pub fn from_dict_with_warnings(
        dict_config: Map<String, Value>,
    ) -> Result<(Self, Option<ConfigWarning>)> {
        let mut unused: Vec<String> = Vec::new();
        let raw: RawCheckConfiguration =
            serde_ignored::deserialize(Value::Object(dict_config), |path| {
                unused.push(path.to_string());
            })
            .map_err(|e| ConfigError::Parse(format!("Invalid configuration: {e}")))?;

        let mut min_version = raw.min_version;
        let mut max_version = raw.max_version;
        if let Some(version) = raw.version {
            error::ensure(
                version.len() == 2,
                ConfigErrorKind::Parse,
                "`version` should have two elements!",
            )?;
            let mut bounds = version.into_iter();
            let (lower, upper) = (bounds.next(), bounds.next());
            min_version = min_version.or(lower);
            max_version = max_version.or(upper);
        }

        let configuration = Self {
            min_version: min_version.map(|v| v.coerce("min_version")).transpose()?,
            max_version: max_version.map(|v| v.coerce("max_version")).transpose()?,
            report: raw.report,
            include: raw.include.unwrap_or_default().into_iter().collect(),
            exclude: raw.exclude.unwrap_or_default().into_iter().collect(),
        };

        let warning =
            (!unused.is_empty()).then_some(ConfigWarning::UnusedConfiguration { keys: unused });
        Ok((configuration, warning))
    }

    /// Loads a `.toml` or `.json` configuration file.
    ///
    /// For a file named `pyproject.toml` the configuration lives in the
    /// `[tool.PyCompatibility]` table, and a missing table is a parse error.
    pub fn from_file(path: &Path) -> Result<Self> {
        error::ensure_with(path.is_file(), || {
            ConfigError::Read(format!(
                "Configuration path {} is not a file!",
                path.display()
            ))
        })?;

        let dict_config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => parse_toml(&read_config(path)?)?,
            Some("json") => parse_json(&read_config(path)?)?,
            _ => {
                return Err(ConfigError::Read(
                    "Configuration path should be a `.toml` or `.json`!".to_string(),
                ));
            }
        };

        let dict_config = if is_pyproject(path) {
            tool_section(dict_config)?.ok_or_else(|| {
                ConfigError::Parse(format!(
                    "No `[tool.{TOOL_SECTION}]` section in `{PYPROJECT_FILE}`"
                ))
            })?
        } else {
            dict_config
        };

        Self::from_dict(dict_config)
    }

    /// Looks for a configuration in `directory`.
    ///
    /// `Compat.json` wins over `pyproject.toml`. A `pyproject.toml` without a
    /// `[tool.PyCompatibility]` table counts as "nothing found", not as an error.
    pub fn discover(directory: &Path) -> Result<Option<Self>> {
        let json_config_file = directory.join(JSON_CONFIG_FILE);
        if json_config_file.is_file() {
            tracing::debug!("Using configuration from {}", json_config_file.display());
            return Self::from_file(&json_config_file).map(Some);
        }

        let pyproject_config_file = directory.join(PYPROJECT_FILE);
        if pyproject_config_file.is_file() {
            let document = parse_toml(&read_config(&pyproject_config_file)?)?;
            return match tool_section(document)? {
                Some(section) => {
                    tracing::debug!(
                        "Using configuration from {}",
                        pyproject_config_file.display()
                    );
                    Self::from_dict(section).map(Some)
                }
                None => {
                    tracing::debug!(
                        "{} has no [tool.{TOOL_SECTION}] section, ignoring it",
                        pyproject_config_file.display()
                    );
                    Ok(None)
                }
            };
        }

        Ok(None)
    }

    pub fn serialize(&self) -> SerializedConfiguration {
        SerializedConfiguration {
            min_version: self.min_version,
            max_version: self.max_version,
            report: self.report.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }

    /// Writes the configuration to `path`, choosing the format from the file name.
    ///
    /// `pyproject.toml` is appended to; `.json` and `.toml` files are overwritten.
    /// Any other suffix fails before the file is touched.
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        format.write(path, &self.serialize())
    }

    /// Validates the version range and turns `include`/`exclude` into a flat set of
    /// canonical, existing files with the exclusions already subtracted.
    pub fn check_and_resolve(&self) -> Result<Self> {
        let validator = StandardValidator::new();
        let range = validator.validate_config(self)?;

        let resolver = FileSystemResolver::new();
        let mut include = BTreeSet::new();
        for path in &self.include {
            validator.validate_path(path, "include")?;
            include.extend(resolver.expand(path)?);
        }
        let mut exclude = BTreeSet::new();
        for path in &self.exclude {
            validator.validate_path(path, "exclude")?;
            exclude.extend(resolver.expand(path)?);
        }
        let include: BTreeSet<PathBuf> = include.difference(&exclude).cloned().collect();

        let report = match &self.report {
            Some(report) => {
                validator.validate_path(report, "report")?;
                Some(resolver.canonicalize(report)?)
            }
            None => None,
        };

        tracing::debug!(
            "Resolved {} file(s) to check, {} excluded",
            include.len(),
            exclude.len()
        );

        Ok(Self {
            min_version: Some(range.min),
            max_version: Some(range.max),
            report,
            include,
            exclude: BTreeSet::new(),
        })
    }
}

fn is_pyproject(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()) == Some(PYPROJECT_FILE)
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ConfigError::Read(format!("Failed to read {}: {e}", path.display()))
    })
}

fn parse_toml(content: &str) -> Result<Map<String, Value>> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(format!("Invalid TOML: {e}")))
}

fn parse_json(content: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse(format!("Invalid JSON: {e}")))
}

/// Extracts `tool.PyCompatibility` from a parsed `pyproject.toml`.
fn tool_section(mut document: Map<String, Value>) -> Result<Option<Map<String, Value>>> {
    let Some(Value::Object(mut tool)) = document.remove("tool") else {
        return Ok(None);
    };
    match tool.remove(TOOL_SECTION) {
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(_) => Err(ConfigError::Parse(format!(
            "`tool.{TOOL_SECTION}` in `{PYPROJECT_FILE}` should be a table"
        ))),
        None => Ok(None),
    }
}
