// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::TaskName;

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Copy static files, compile stylesheets, and watch for changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Build task to run.
    #[arg(value_enum, default_value_t = TaskName::All)]
    pub task: TaskName,

    /// Path to the config file (TOML).
    ///
    /// When omitted, `Assetpipe.toml` is used if present, otherwise the
    /// built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the source tree root.
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Override the build tree root.
    #[arg(long, value_name = "DIR")]
    pub build: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Classify the source tree and print the plan without touching disk.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_to_all() {
        let args = CliArgs::try_parse_from(["assetpipe"]).unwrap();
        assert_eq!(args.task, TaskName::All);
        assert!(args.config.is_none());
    }

    #[test]
    fn parses_task_and_overrides() {
        let args = CliArgs::try_parse_from([
            "assetpipe",
            "stylesheets",
            "--src",
            "assets",
            "--build",
            "out",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.task, TaskName::Stylesheets);
        assert_eq!(args.src, Some(PathBuf::from("assets")));
        assert_eq!(args.build, Some(PathBuf::from("out")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn rejects_unknown_task() {
        assert!(CliArgs::try_parse_from(["assetpipe", "deploy"]).is_err());
    }
}
