// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every run option is optional here so that values from the config file can
//! fill the gaps; see [`crate::config::RunSettings::resolve`] for precedence.

use clap::{Parser, ValueEnum};

use crate::types::{ExecMode, LabelStyle};

/// Command-line arguments for `fanexec`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "fanexec",
    version,
    about = "Run a command template once per input row, concurrently, with tagged output.",
    long_about = None
)]
pub struct CliArgs {
    /// Command template, e.g. `echo {{.Arg}}` or `ping -c1 {{index .Args 1}}`.
    ///
    /// Default: `echo {{.Arg}}`.
    #[arg(long, value_name = "TEMPLATE")]
    pub cmd: Option<String>,

    /// Delimited input file, one record per line. `-` reads standard input.
    ///
    /// Default: `/dev/stdin`.
    #[arg(long, value_name = "PATH")]
    pub input: Option<String>,

    /// Optional config file (TOML).
    ///
    /// If omitted, `Fanexec.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Field delimiter of the input (single ASCII character).
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// How output lines are labelled.
    #[arg(long, value_enum, value_name = "STYLE")]
    pub label: Option<LabelStyle>,

    /// Run commands through the shell or execute them directly.
    #[arg(long = "exec", value_enum, value_name = "MODE")]
    pub exec_mode: Option<ExecMode>,

    /// Capacity of the shared output line queue.
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FANEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the generated commands without running them.
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
