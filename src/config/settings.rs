// src/config/settings.rs

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RunSection};
use crate::config::validate::{validate_delimiter, validate_queue_capacity};
use crate::errors::{FanexecError, Result};
use crate::params::{InputSource, ReaderOptions};
use crate::types::{ExecMode, LabelStyle};

/// Template used when neither the CLI nor the config names one.
pub const DEFAULT_TEMPLATE: &str = "echo {{.Arg}}";

/// Record source used when neither the CLI nor the config names one.
pub const DEFAULT_INPUT: &str = "/dev/stdin";

/// Effective options for one run.
///
/// Precedence per option: CLI flag, then `[run]` in the config file, then the
/// built-in default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub template: String,
    pub input: InputSource,
    pub reader: ReaderOptions,
    pub label: LabelStyle,
    pub exec_mode: ExecMode,
    pub shell: Option<String>,
    pub queue_capacity: usize,
    pub dry_run: bool,
}

impl RunSettings {
    pub fn resolve(args: &CliArgs, config: Option<&ConfigFile>) -> Result<Self> {
        let defaults = RunSection::default();
        let run = config.map(|c| &c.run).unwrap_or(&defaults);

        let template = args
            .cmd
            .clone()
            .or_else(|| run.cmd.clone())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        if template.trim().is_empty() {
            return Err(FanexecError::ConfigError(
                "command template must not be empty".to_string(),
            ));
        }

        let input = args
            .input
            .as_deref()
            .or(run.input.as_deref())
            .unwrap_or(DEFAULT_INPUT);

        let delimiter = validate_delimiter(args.delimiter.unwrap_or(run.delimiter))?;
        let queue_capacity =
            validate_queue_capacity(args.queue_capacity.unwrap_or(run.queue_capacity))?;

        Ok(Self {
            template,
            input: InputSource::from_arg(input),
            reader: ReaderOptions { delimiter },
            label: args.label.unwrap_or(run.label),
            exec_mode: args.exec_mode.unwrap_or(run.exec),
            shell: run.shell.clone(),
            queue_capacity,
            dry_run: args.dry_run,
        })
    }
}
