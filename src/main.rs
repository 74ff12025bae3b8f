//! pycompat checks a code base against a range of interpreter versions.
//! The range and the files to look at come from `Compat.json`, a
//! `[tool.PyCompatibility]` table in `pyproject.toml`, an explicit
//! configuration file, or the command line. This binary prepares and
//! validates that configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pycompat::builders::merger::ConfigOverrides;
use pycompat::core::config::{CheckConfiguration, JSON_CONFIG_FILE};
use pycompat::utils;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pycompat")]
#[command(about = "Check a code base's compatibility against a range of interpreter versions")]
#[command(version)]
struct Cli {
    /// The logging level. Logs below this level are not shown
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Path to the configuration file
    #[arg(long = "configuration-path", visible_alias = "cfg", global = true)]
    configuration_path: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration and check the included files
    Check {
        /// Files or directories to check
        include: Vec<PathBuf>,
        /// The min version to check
        #[arg(long)]
        min_version: Option<u32>,
        /// The max version to check
        #[arg(long)]
        max_version: Option<u32>,
        /// The version range to check
        #[arg(short = 'V', long = "version", num_args = 2, value_names = ["MIN", "MAX"])]
        version_range: Option<Vec<u32>>,
        /// Files or directories that will not be checked
        #[arg(long)]
        exclude: Vec<PathBuf>,
        /// The path to the file to write the JSON check report
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,
    },
    /// Write a configuration file (`pyproject.toml`, `*.json` or `*.toml`)
    Init {
        /// Where to write the configuration
        #[arg(long, default_value = JSON_CONFIG_FILE)]
        path: PathBuf,
        /// The min version to check
        #[arg(long)]
        min_version: Option<u32>,
        /// The max version to check
        #[arg(long)]
        max_version: Option<u32>,
        /// The path to the file to write the JSON check report
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,
        /// Files or directories to check (repeatable)
        #[arg(long)]
        include: Vec<PathBuf>,
        /// Files or directories that will not be checked (repeatable)
        #[arg(long)]
        exclude: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::logging::init(cli.log_level.as_deref(), !cli.no_color);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            include,
            min_version,
            max_version,
            version_range,
            exclude,
            report,
        } => {
            let overrides = ConfigOverrides {
                min_version,
                max_version,
                version: version_range.map(|range| (range[0], range[1])),
                report,
                include,
                exclude,
            };
            let search_dir = std::env::current_dir()?;
            utils::run_check(cli.configuration_path.as_deref(), &search_dir, overrides)?;
            Ok(())
        }
        Commands::Init {
            path,
            min_version,
            max_version,
            report,
            include,
            exclude,
        } => {
            let configuration = CheckConfiguration::new(
                min_version,
                max_version,
                report,
                include.into_iter().collect(),
                exclude.into_iter().collect(),
            );
            utils::write_configuration(&configuration, &path)
        }
    }
}
