use std::fmt;
use thiserror::Error;

/// How serious a reported condition is.
///
/// Failures abort the current resolution and propagate up to the CLI, warnings
/// are logged and resolution carries on with whatever was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Failure,
    Warning,
}

/// The three ways a configuration can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The source could not be read: missing, not a regular file, or an unsupported type.
    Read,
    /// The destination file type cannot be written.
    Write,
    /// The content is structurally invalid or references paths that do not exist.
    Parse,
}

impl ConfigErrorKind {
    /// The name used when the error is shown to the user.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigErrorKind::Read => "ReadConfigurationError",
            ConfigErrorKind::Write => "WriteConfigurationError",
            ConfigErrorKind::Parse => "ParseConfigurationError",
        }
    }
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hard failure raised while loading, writing or resolving a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ReadConfigurationError: {0}")]
    Read(String),

    #[error("WriteConfigurationError: {0}")]
    Write(String),

    #[error("ParseConfigurationError: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Builds an error of the given kind carrying `message`.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ConfigErrorKind::Read => ConfigError::Read(message),
            ConfigErrorKind::Write => ConfigError::Write(message),
            ConfigErrorKind::Parse => ConfigError::Parse(message),
        }
    }

    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::Read(_) => ConfigErrorKind::Read,
            ConfigError::Write(_) => ConfigErrorKind::Write,
            ConfigError::Parse(_) => ConfigErrorKind::Parse,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ConfigError::Read(message) | ConfigError::Write(message) | ConfigError::Parse(message) => {
                message
            }
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Failure
    }
}

/// Non-fatal condition noticed while reading a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The input contained keys that are not part of the schema.
    UnusedConfiguration { keys: Vec<String> },
}

impl ConfigWarning {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigWarning::UnusedConfiguration { .. } => "UnusedConfigurationWarning",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfigWarning::UnusedConfiguration { keys } => {
                format!("Unused configuration: {}", keys.join(" "))
            }
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Warning
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fails with a `kind` error carrying `message` when `condition` does not hold.
pub fn ensure(condition: bool, kind: ConfigErrorKind, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::new(kind, message))
    }
}

/// Like [`ensure`], but returns a pre-built error. The error is only built on failure.
pub fn ensure_with(condition: bool, error: impl FnOnce() -> ConfigError) -> Result<()> {
    if condition { Ok(()) } else { Err(error()) }
}

/// Emits `warning` through the logger, tagged with the component that raised it.
pub fn warn(warning: &ConfigWarning, logger: Option<&str>) {
    let message = warning.message();
    match logger {
        Some(logger) => tracing::warn!(logger, category = warning.name(), "{}: {}", warning.name(), message),
        None => tracing::warn!(category = warning.name(), "{}: {}", warning.name(), message),
    }
}
