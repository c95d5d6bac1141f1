// src/errors.rs

//! Crate-wide error types.
//!
//! [`FanexecError`] covers the fatal, phase-stopping failures (reading the
//! record source, parsing the template, binding a record, launching a
//! process). Failures that happen while commands are running are never fatal
//! and are collected as [`ProcessExitError`] / [`StreamReadError`] values
//! instead.

use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FanexecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot read record source {path}: {message}")]
    InputUnreadable { path: String, message: String },

    #[error("Malformed record source: {0}")]
    ParseError(#[from] csv::Error),

    #[error("Template syntax error at byte {offset}: {message}")]
    TemplateSyntax { offset: usize, message: String },

    #[error("Template binding failed for record {index}: {message}")]
    TemplateBinding { index: usize, message: String },

    #[error("Failed to launch {command:?}: {message}")]
    LaunchError { command: String, message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FanexecError>;

/// A launched command that did not exit successfully.
#[derive(Error, Debug)]
pub enum ProcessExitError {
    #[error("{command:?} exited with {status}")]
    Status { command: String, status: ExitStatus },

    #[error("waiting for {command:?} failed: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessExitError {
    /// Command line of the process this error belongs to.
    pub fn command(&self) -> &str {
        match self {
            ProcessExitError::Status { command, .. } | ProcessExitError::Wait { command, .. } => {
                command
            }
        }
    }

    /// Exit code, when the process exited normally with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessExitError::Status { status, .. } => status.code(),
            ProcessExitError::Wait { .. } => None,
        }
    }
}

/// A stream reader stopped early because reading failed.
#[derive(Error, Debug)]
#[error("reading {label} failed: {source}")]
pub struct StreamReadError {
    pub label: String,
    #[source]
    pub source: std::io::Error,
}
