use std::path::Path;

use crate::core::config::CheckConfiguration;
use crate::core::error::{self, ConfigError, ConfigErrorKind, Result};

/// An inclusive, ordered range of interpreter minor versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: u32,
    pub max: u32,
}

/// The `ConfigValidator` trait defines the checks a configuration has to pass
/// before its paths are resolved.
pub trait ConfigValidator {
    /// Checks the version bounds of `config` and returns them as a range.
    ///
    /// # Returns
    /// A `Result<VersionRange>`; fails with `ParseConfigurationError` when a bound
    /// is missing or the bounds are out of order.
    fn validate_config(&self, config: &CheckConfiguration) -> Result<VersionRange>;

    /// Checks that a path named in the configuration exists.
    ///
    /// # Arguments
    /// * `path`: The path as written in the configuration.
    /// * `role`: Which field it came from (`include`, `exclude`, `report`), used in the message.
    fn validate_path(&self, path: &Path, role: &str) -> Result<()>;
}

/// The `StandardValidator` is the validator used by `check_and_resolve`.
pub struct StandardValidator;

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    /// Bounds are checked for presence first, then for order, so a missing bound
    /// is always reported before anything touches the filesystem.
    fn validate_config(&self, config: &CheckConfiguration) -> Result<VersionRange> {
        let (Some(min), Some(max)) = (config.min_version(), config.max_version()) else {
            return Err(ConfigError::Parse(
                "No min and/or max version specified!".to_string(),
            ));
        };
        error::ensure(
            min <= max,
            ConfigErrorKind::Parse,
            format!("min_version ({min}) should be less than or equal to max_version ({max})"),
        )?;
        Ok(VersionRange { min, max })
    }

    fn validate_path(&self, path: &Path, role: &str) -> Result<()> {
        error::ensure(
            path.exists(),
            ConfigErrorKind::Parse,
            format!("{role} path {} doesn't exist!", path.display()),
        )
    }
}
