#![allow(dead_code)]

use fanexec::generate::GeneratedCommand;
use fanexec::params::ParameterRecord;

/// Build records from string rows. Empty rows are dropped, as the reader does.
pub fn records(rows: &[&[&str]]) -> Vec<ParameterRecord> {
    rows.iter()
        .filter_map(|row| ParameterRecord::new(row.iter().map(|s| s.to_string()).collect()))
        .collect()
}

/// Builder for a list of `GeneratedCommand`s.
///
/// ```ignore
/// let commands = CommandsBuilder::new()
///     .with("P1", "printf 'a\\nb\\n'")
///     .with("P2", "echo x >&2; exit 1")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct CommandsBuilder {
    commands: Vec<GeneratedCommand>,
}

impl CommandsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command whose record is the single field `label`.
    pub fn with(self, label: &str, command_line: &str) -> Self {
        self.with_args(&[label], command_line)
    }

    /// Add a command with an explicit record.
    pub fn with_args(mut self, args: &[&str], command_line: &str) -> Self {
        self.commands.push(GeneratedCommand::new(
            command_line,
            args.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> Vec<GeneratedCommand> {
        self.commands
    }
}
