// src/config/model.rs

use serde::Deserialize;

use crate::aggregate::DEFAULT_QUEUE_CAPACITY;
use crate::types::{ExecMode, LabelStyle};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [run]
/// cmd = "ssh {{.Arg}} uptime"
/// input = "hosts.csv"
/// delimiter = ";"
/// label = "joined"
/// exec = "shell"
/// shell = "bash"
/// queue_capacity = 500
/// ```
///
/// Every key is optional; CLI flags take precedence over anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Command template.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Record source path; `-` means standard input.
    #[serde(default)]
    pub input: Option<String>,

    /// Field delimiter of the record source.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default)]
    pub label: LabelStyle,

    #[serde(default)]
    pub exec: ExecMode,

    /// Shell program used in `exec = "shell"` mode (invoked as `<shell> -c`).
    #[serde(default)]
    pub shell: Option<String>,

    /// Capacity of the shared output line queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_delimiter() -> char {
    ','
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cmd: None,
            input: None,
            delimiter: default_delimiter(),
            label: LabelStyle::default(),
            exec: ExecMode::default(),
            shell: None,
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// A validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(run: RunSection) -> Self {
        Self { run }
    }
}
