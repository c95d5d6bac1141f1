// src/exec/shell.rs

//! Pluggable shell execution provider.
//!
//! The launcher never builds a `tokio::process::Command` itself; it asks a
//! [`ShellProvider`] to turn a generated command line into one. This keeps
//! the implicit shell call in one place and lets callers replace it:
//!
//! - [`SystemShell`] (default) runs `sh -c <line>` (`cmd /C` on Windows), so
//!   the line may use pipes, redirects, variables, etc.
//! - [`DirectExec`] splits the line on whitespace and executes the first word
//!   with the rest as argv. No shell parsing at all.
//!
//! Providers only describe *what* to run; stdio wiring, spawning and
//! cancellation stay in [`super::launcher`].

use tokio::process::Command;

use crate::errors::{FanexecError, Result};
use crate::types::ExecMode;

/// Turns a command line into a ready-to-spawn [`Command`].
pub trait ShellProvider: Send + Sync {
    fn command(&self, command_line: &str) -> Result<Command>;
}

/// Run each command line through a shell.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: String,
    flag: String,
}

impl SystemShell {
    /// Use a specific shell program, e.g. `bash`. The flag stays `-c`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: "-c".to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                program: "cmd".to_string(),
                flag: "/C".to_string(),
            }
        } else {
            Self::with_program("sh")
        }
    }
}

impl ShellProvider for SystemShell {
    fn command(&self, command_line: &str) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.flag).arg(command_line);
        Ok(cmd)
    }
}

/// Execute command lines without a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExec;

impl ShellProvider for DirectExec {
    fn command(&self, command_line: &str) -> Result<Command> {
        let mut words = command_line.split_whitespace();
        let program = words.next().ok_or_else(|| FanexecError::LaunchError {
            command: command_line.to_string(),
            message: "empty command line".to_string(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(words);
        Ok(cmd)
    }
}

/// Build the provider selected by an [`ExecMode`].
///
/// `shell_program` only applies to [`ExecMode::Shell`]; `None` picks the
/// platform default.
pub fn provider_for(mode: ExecMode, shell_program: Option<&str>) -> Box<dyn ShellProvider> {
    match mode {
        ExecMode::Shell => match shell_program {
            Some(program) => Box::new(SystemShell::with_program(program)),
            None => Box::new(SystemShell::default()),
        },
        ExecMode::Direct => Box::new(DirectExec),
    }
}
