//! CLI argument definitions for `Akiko`

use clap::{builder::BoolishValueParser, ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use akiko::config::ConfigOverrides;
use akiko::logger::Level;

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to `logger::Level`
/// for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&Level::from(*self), f)
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `catalog`, `out_dir`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Tally credits for one or more transcripts.
    ///
    /// Imports each transcript CSV, resolves course positions against the
    /// catalog and rules, and reports credits per cell, column and in total.
    Tally {
        /// Paths to transcript CSV files (supports multiple)
        #[arg(value_name = "TRANSCRIPTS", num_args = 1..)]
        transcripts: Vec<PathBuf>,

        /// Course ids planned but not yet on the transcript
        #[arg(long, value_name = "IDS", num_args = 1.., value_delimiter = ',')]
        plan: Vec<String>,

        /// Output file paths (optional; defaults to config `out_dir` when omitted)
        ///
        /// When provided, must match the number of transcripts 1:1.
        #[arg(short, long, value_name = "FILES", num_args = 1..)]
        output: Vec<PathBuf>,

        /// Skip CSV export and only print the summary
        #[arg(long)]
        no_csv: bool,
    },
    /// Check the requirement table, catalog and rules for consistency.
    Check,
}

#[derive(Parser, Debug)]
#[command(
    name = "akiko",
    about = "Akiko degree credit tally",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override catalog CSV path
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Override requirement table path
    #[arg(long, value_name = "PATH")]
    pub requirements: Option<PathBuf>,

    /// Override classification rules path
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Override config output directory
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Treat the student as native to the program
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "transfer")]
    pub native: bool,

    /// Treat the student as a transfer student
    #[arg(long, action = ArgAction::SetTrue)]
    pub transfer: bool,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

fn path_string(path: Option<&PathBuf>) -> Option<String> {
    path.map(|p| p.to_string_lossy().to_string())
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// `None` means no override. `--native`/`--transfer` override `student.native`.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let native = match (self.native, self.transfer) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };

        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: path_string(self.config_log_file.as_ref()),
            verbose: self.config_verbose,
            catalog: path_string(self.catalog.as_ref()),
            requirements: path_string(self.requirements.as_ref()),
            rules: path_string(self.rules.as_ref()),
            out_dir: path_string(self.out_dir.as_ref()),
            native,
        }
    }
}
