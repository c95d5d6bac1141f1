use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// How the per-process stream label is derived from the record fields.
///
/// - `First`: use only the first field (`"host1 (stdout)"`).
/// - `Joined`: use every field joined with `,` (`"host1,22 (stdout)"`), which
///   keeps labels distinct when several rows share a first field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    First,
    Joined,
}

impl Default for LabelStyle {
    fn default() -> Self {
        LabelStyle::First
    }
}

impl LabelStyle {
    /// Base label (without the stream suffix) for a record's fields.
    pub fn label_for(self, args: &[String]) -> String {
        match self {
            LabelStyle::First => args.first().cloned().unwrap_or_default(),
            LabelStyle::Joined => args.join(","),
        }
    }
}

impl FromStr for LabelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(LabelStyle::First),
            "joined" => Ok(LabelStyle::Joined),
            other => Err(format!(
                "invalid label style: {other} (expected \"first\" or \"joined\")"
            )),
        }
    }
}

/// How a generated command line is turned into a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Run through the shell (`sh -c <line>`), so shell syntax is allowed.
    Shell,
    /// Split the line on whitespace and execute the first word directly.
    Direct,
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Shell
    }
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shell" => Ok(ExecMode::Shell),
            "direct" => Ok(ExecMode::Direct),
            other => Err(format!(
                "invalid exec mode: {other} (expected \"shell\" or \"direct\")"
            )),
        }
    }
}
