use anyhow::{Context, Result};
use std::path::Path;

use crate::builders::merger::ConfigOverrides;
use crate::core::config::CheckConfiguration;

pub mod logging;

/// Builds the configuration for a `check` run.
///
/// An explicit `configuration_path` is loaded as is; otherwise `search_dir` is searched.
/// The command-line overrides are then layered on top, and the merged result is
/// validated and resolved.
pub fn run_check(
    configuration_path: Option<&Path>,
    search_dir: &Path,
    overrides: ConfigOverrides,
) -> Result<CheckConfiguration> {
    let file_configuration = match configuration_path {
        Some(path) => Some(CheckConfiguration::from_file(path)?),
        None => CheckConfiguration::discover(search_dir)?,
    };
    if file_configuration.is_none() {
        tracing::debug!("No configuration file found, using command-line options only");
    }

    let merged = overrides.merge(file_configuration.as_ref())?;
    let configuration = CheckConfiguration::from_dict(merged)?.check_and_resolve()?;

    tracing::debug!("Using configuration: {configuration:?}");
    tracing::info!(
        "Checking {} file(s) against versions {}..={}",
        configuration.include().len(),
        configuration.min_version().unwrap_or_default(),
        configuration.max_version().unwrap_or_default()
    );
    Ok(configuration)
}

/// Writes `configuration` to `path` in the format its file name asks for.
pub fn write_configuration(configuration: &CheckConfiguration, path: &Path) -> Result<()> {
    configuration
        .to_file(path)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
    println!("✓ Wrote configuration to {}", path.display());
    Ok(())
}
