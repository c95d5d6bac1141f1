// src/exec/launcher.rs

//! Launching generated commands as child processes.

use std::process::{ExitStatus, Stdio};

use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::{FanexecError, ProcessExitError, Result};
use crate::exec::command_set::{ChildProcess, CommandSet, ErrorSink};
use crate::exec::latch::CountdownLatch;
use crate::exec::shell::ShellProvider;
use crate::generate::GeneratedCommand;
use crate::types::LabelStyle;

/// Outcome of the launch phase.
///
/// `set` always holds every process that was started, even when `error`
/// reports that launching stopped early.
#[derive(Debug)]
pub struct Launched {
    pub set: CommandSet,
    pub error: Option<FanexecError>,
}

/// Start every command immediately, in order.
///
/// Stops at the first command that cannot be started (or at the first one
/// reached after `cancel` fired); processes already running are left alone
/// and stay in the returned set. Once `cancel` fires, every running process
/// is asked to terminate.
///
/// Must be called from within a Tokio runtime.
pub fn launch_commands(
    commands: Vec<GeneratedCommand>,
    shell: &dyn ShellProvider,
    label_style: LabelStyle,
    cancel: &CancellationToken,
) -> Launched {
    let total = commands.len();
    let mut set = CommandSet::new();
    let mut error = None;

    for command in commands {
        if cancel.is_cancelled() {
            warn!(
                command = %command.command_line(),
                "cancelled before launch; not starting remaining commands"
            );
            error = Some(FanexecError::LaunchError {
                command: command.command_line().to_string(),
                message: "cancelled before start".to_string(),
            });
            break;
        }

        match launch_one(&command, shell, label_style, &set, cancel) {
            Ok(process) => set.push(process),
            Err(err) => {
                error!(
                    command = %command.command_line(),
                    launched = set.len(),
                    error = %err,
                    "launch failed; not starting remaining commands"
                );
                error = Some(err);
                break;
            }
        }
    }

    set.seal();
    info!(launched = set.len(), total, "launch phase finished");

    Launched { set, error }
}

fn launch_one(
    command: &GeneratedCommand,
    shell: &dyn ShellProvider,
    label_style: LabelStyle,
    set: &CommandSet,
    cancel: &CancellationToken,
) -> Result<ChildProcess> {
    let line = command.command_line();
    let launch_error = |message: String| FanexecError::LaunchError {
        command: line.to_string(),
        message,
    };

    let mut cmd = shell.command(line)?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| launch_error(e.to_string()))?;

    // Dropping `child` here kills it (kill_on_drop).
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(launch_error("output pipes unavailable".to_string()));
    };

    let pid = child.id();
    info!(command = %line, pid, "executing {:?}", line);

    set.latch().add();
    spawn_exit_waiter(
        child,
        line.to_string(),
        set.error_sink(),
        set.latch().clone(),
        cancel.clone(),
    );

    Ok(ChildProcess::new(
        label_style.label_for(command.original_args()),
        line.to_string(),
        command.original_args().to_vec(),
        pid,
        stdout,
        stderr,
    ))
}

/// Wait for `child` to exit, record a failure if it did not succeed, then
/// count the latch down.
///
/// Cancellation only sends the kill; the task still waits for the actual
/// exit, so output written before it stays readable.
fn spawn_exit_waiter(
    mut child: Child,
    command: String,
    errors: ErrorSink,
    latch: CountdownLatch,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                info!(%command, "cancellation requested; terminating process");
                if let Err(e) = child.start_kill() {
                    debug!(%command, error = %e, "kill failed; process probably exited already");
                }
                child.wait().await
            }
        };

        if let Some(failure) = exit_failure(&command, status) {
            errors.lock().push(failure);
        }
        latch.count_down();
    });
}

fn exit_failure(
    command: &str,
    status: std::io::Result<ExitStatus>,
) -> Option<ProcessExitError> {
    match status {
        Ok(status) if status.success() => {
            info!(%command, exit_code = 0, success = true, "process exited");
            None
        }
        Ok(status) => {
            warn!(
                %command,
                exit_code = status.code().unwrap_or(-1),
                success = false,
                "process exited"
            );
            Some(ProcessExitError::Status {
                command: command.to_string(),
                status,
            })
        }
        Err(source) => {
            error!(%command, error = %source, "waiting for process failed");
            Some(ProcessExitError::Wait {
                command: command.to_string(),
                source,
            })
        }
    }
}
