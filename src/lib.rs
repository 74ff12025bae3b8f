//! Configuration loading and resolution for `pycompat`, a tool that checks a
//! code base against a range of interpreter versions.

pub mod builders;
pub mod core;
pub mod utils;


pub use crate::builders::merger::ConfigOverrides;
pub use crate::core::config::CheckConfiguration;
pub use crate::core::error::{ConfigError, ConfigErrorKind, ConfigWarning, Severity};
