// src/generate.rs

//! Command generation: bind each [`ParameterRecord`] into the template.

use tracing::{debug, warn};

use crate::errors::{FanexecError, Result};
use crate::params::ParameterRecord;
use crate::template::{Bindings, CommandTemplate, TemplateError};

/// A fully expanded command, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCommand {
    command_line: String,
    original_args: Vec<String>,
}

impl GeneratedCommand {
    pub fn new(command_line: impl Into<String>, original_args: Vec<String>) -> Self {
        Self {
            command_line: command_line.into(),
            original_args,
        }
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn original_args(&self) -> &[String] {
        &self.original_args
    }
}

/// Result of a generation pass.
///
/// When a record fails to bind, generation stops there: `commands` holds
/// everything generated before it and `error` the binding failure.
#[derive(Debug)]
pub struct Generated {
    pub commands: Vec<GeneratedCommand>,
    pub error: Option<FanexecError>,
}

impl Generated {
    /// Discard the partial commands if generation halted.
    pub fn into_result(self) -> Result<Vec<GeneratedCommand>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.commands),
        }
    }
}

/// Expand `template` once per record, in record order.
///
/// A template that does not parse fails the whole call before any record is
/// looked at.
pub fn generate_commands(template: &str, params: &[ParameterRecord]) -> Result<Generated> {
    let template = CommandTemplate::parse(template).map_err(|e| match e {
        TemplateError::Syntax { offset, message } => {
            FanexecError::TemplateSyntax { offset, message }
        }
        TemplateError::Binding(message) => FanexecError::TemplateSyntax { offset: 0, message },
    })?;

    let mut commands = Vec::with_capacity(params.len());
    for (index, record) in params.iter().enumerate() {
        let bindings = Bindings {
            args: record.args(),
            arg: record.primary_arg(),
        };

        match template.render(bindings) {
            Ok(line) => {
                debug!(index, command = %line, "generated command");
                commands.push(GeneratedCommand::new(line, record.args().to_vec()));
            }
            Err(e) => {
                warn!(
                    index,
                    generated = commands.len(),
                    error = %e,
                    "template binding failed; halting generation"
                );
                return Ok(Generated {
                    commands,
                    error: Some(FanexecError::TemplateBinding {
                        index,
                        message: e.to_string(),
                    }),
                });
            }
        }
    }

    Ok(Generated {
        commands,
        error: None,
    })
}
