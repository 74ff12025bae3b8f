use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LEVEL: &str = "info";

/// Installs the terminal logger.
///
/// `level` comes from `--log-level`; without it `RUST_LOG` is used, then `info`.
/// An unrecognised level falls back to `info` and is reported once the logger is up.
/// Returns `false` when a logger was already installed, in which case nothing changes.
pub fn init(level: Option<&str>, color: bool) -> bool {
    let (filter, rejected) = build_filter(level);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(color)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Logging already initialized, skipping.");
    }
    if let Some(rejected) = rejected {
        tracing::warn!("Unknown log level `{rejected}`, using `{DEFAULT_LEVEL}` instead");
    }
    installed
}

/// Accepts a plain level name (`debug`, `WARN`, ...) or a full filter directive
/// such as `pycompat=debug`. Returns the rejected input alongside the fallback filter.
fn build_filter(level: Option<&str>) -> (EnvFilter, Option<String>) {
    let fallback = || EnvFilter::new(DEFAULT_LEVEL);
    let Some(level) = level else {
        return (EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()), None);
    };

    if let Ok(level_filter) = level.to_ascii_lowercase().parse::<LevelFilter>() {
        return (EnvFilter::new(level_filter.to_string()), None);
    }
    if level.contains('=')
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return (filter, None);
    }
    (fallback(), Some(level.to_string()))
}
