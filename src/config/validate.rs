// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, RunSection};
use crate::errors::{FanexecError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FanexecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_run_section(&raw.run)?;
        Ok(ConfigFile::new_unchecked(raw.run))
    }
}

fn validate_run_section(run: &RunSection) -> Result<()> {
    if let Some(cmd) = &run.cmd {
        if cmd.trim().is_empty() {
            return Err(FanexecError::ConfigError(
                "[run].cmd must not be empty".to_string(),
            ));
        }
    }
    if let Some(shell) = &run.shell {
        if shell.trim().is_empty() {
            return Err(FanexecError::ConfigError(
                "[run].shell must not be empty".to_string(),
            ));
        }
    }
    validate_delimiter(run.delimiter)?;
    validate_queue_capacity(run.queue_capacity)?;
    Ok(())
}

/// Check a field delimiter and convert it to the byte the reader wants.
///
/// It must be a single ASCII character other than a quote or line break.
pub fn validate_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
        return Err(FanexecError::ConfigError(format!(
            "delimiter must be a single ASCII character other than a quote or newline (got {delimiter:?})"
        )));
    }
    Ok(delimiter as u8)
}

pub fn validate_queue_capacity(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Err(FanexecError::ConfigError(
            "queue_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(capacity)
}
