use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::core::config::{CheckConfiguration, SerializedConfiguration};
use crate::core::error::{ConfigError, Result};

/// Values given on the command line for a `check` run.
///
/// Every scalar is optional so a missing flag falls through to the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub min_version: Option<u32>,
    pub max_version: Option<u32>,
    /// `--version MIN MAX`, consulted only for bounds still missing after the file.
    pub version: Option<(u32, u32)>,
    pub report: Option<PathBuf>,
    pub include: Vec<PathBuf>,
    pub exclude: Vec<PathBuf>,
}

impl ConfigOverrides {
    /// Layers the overrides on top of `file` and returns the merged raw mapping.
    ///
    /// Scalars take the first value present in this order: explicit flag, file,
    /// `--version`. `include` and `exclude` are the union of both sources.
    pub fn merge(self, file: Option<&CheckConfiguration>) -> Result<Map<String, Value>> {
        let mut merged = SerializedConfiguration {
            min_version: self.min_version,
            max_version: self.max_version,
            report: self.report,
            include: self.include.into_iter().collect(),
            exclude: self.exclude.into_iter().collect(),
        };

        if let Some(file) = file {
            merged.min_version = merged.min_version.or(file.min_version());
            merged.max_version = merged.max_version.or(file.max_version());
            merged.report = merged.report.or_else(|| file.report().map(PathBuf::from));
            merged.include.extend(file.include().iter().cloned());
            merged.exclude.extend(file.exclude().iter().cloned());
        }
        if let Some((min, max)) = self.version {
            merged.min_version = merged.min_version.or(Some(min));
            merged.max_version = merged.max_version.or(Some(max));
        }

        let merge_error =
            |e: String| ConfigError::Parse(format!("Failed to merge command-line options: {e}"));
        match serde_json::to_value(&merged).map_err(|e| merge_error(e.to_string()))? {
            Value::Object(map) => Ok(map),
            other => Err(merge_error(format!("expected a mapping, got {other}"))),
        }
    }
}
