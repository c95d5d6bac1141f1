// src/lib.rs

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod generate;
pub mod logging;
pub mod params;
pub mod template;
pub mod types;

use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregation;
use crate::cli::CliArgs;
use crate::config::{RunSettings, discover_config};
use crate::errors::{ProcessExitError, Result, StreamReadError};
use crate::exec::{Launched, launch_commands, provider_for};
use crate::fs::RealFileSystem;
use crate::generate::{GeneratedCommand, generate_commands};
use crate::params::read_params;

/// What happened in a run, for the caller to report or act on.
///
/// Failed commands do not make the run itself fail; deciding whether they
/// should is left to whoever holds the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub launched: usize,
    pub failed: usize,
    pub stream_errors: usize,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config discovery and CLI precedence
/// - reading parameter records
/// - command generation
/// - launching, output aggregation and waiting
/// - Ctrl-C handling (cancels every running command)
pub async fn run(args: CliArgs) -> Result<RunSummary> {
    let fs = RealFileSystem;
    let config = discover_config(&fs, args.config.as_deref())?;
    let settings = RunSettings::resolve(&args, config.as_ref())?;

    let params = read_params(&fs, &settings.input, settings.reader)?;
    info!(records = params.len(), input = %settings.input, "parameter records loaded");

    let commands = generate_commands(&settings.template, &params)?.into_result()?;

    if settings.dry_run {
        print_dry_run(&settings, &commands);
        return Ok(RunSummary::default());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; terminating running commands");
            cancel.cancel();
        });
    }

    execute(commands, &settings, &cancel).await
}

/// Launch `commands`, print their tagged output to stdout while they run and
/// wait for all of them.
///
/// A launch failure is returned only after every process that did start has
/// exited and its output has been printed.
pub async fn execute(
    commands: Vec<GeneratedCommand>,
    settings: &RunSettings,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let shell = provider_for(settings.exec_mode, settings.shell.as_deref());
    let Launched { mut set, error } =
        launch_commands(commands, shell.as_ref(), settings.label, cancel);
    let launched = set.len();

    let printer = set
        .aggregate(settings.queue_capacity)
        .map(|aggregation| tokio::spawn(print_lines(aggregation)));

    let failures = set.wait().await;
    debug!(failed = failures.len(), "all launched processes exited");

    let stream_errors = match printer {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            warn!(error = %e, "output printer task failed");
            Vec::new()
        }),
        None => Vec::new(),
    };

    report_failures(&failures, &stream_errors);

    if let Some(err) = error {
        return Err(err);
    }

    Ok(RunSummary {
        launched,
        failed: failures.len(),
        stream_errors: stream_errors.len(),
    })
}

/// Print every tagged line as `[<label>] <text>`.
///
/// After the first write error (e.g. a closed pipe) lines are still received
/// but dropped, so the readers keep draining and no child blocks on a full
/// pipe.
async fn print_lines(mut aggregation: Aggregation) -> Vec<StreamReadError> {
    let mut stdout = tokio::io::stdout();
    let mut writable = true;

    while let Some(line) = aggregation.recv().await {
        if !writable {
            continue;
        }
        if let Err(e) = stdout.write_all(format!("{line}\n").as_bytes()).await {
            debug!(error = %e, "stdout closed; discarding remaining output");
            writable = false;
        }
    }
    if writable {
        let _ = stdout.flush().await;
    }

    aggregation.finish().await
}

fn report_failures(failures: &[ProcessExitError], stream_errors: &[StreamReadError]) {
    if failures.is_empty() && stream_errors.is_empty() {
        return;
    }

    eprintln!(
        "fanexec: {} command(s) failed, {} stream(s) could not be read",
        failures.len(),
        stream_errors.len()
    );
    for failure in failures {
        eprintln!("  - {failure}");
    }
    for err in stream_errors {
        eprintln!("  - {err}");
    }
}

/// Simple dry-run output: print settings and the generated commands.
fn print_dry_run(settings: &RunSettings, commands: &[GeneratedCommand]) {
    println!("fanexec dry-run");
    println!("  template = {}", settings.template);
    println!("  input = {}", settings.input);
    println!("  exec = {:?}", settings.exec_mode);
    println!("  label = {:?}", settings.label);
    println!("  queue_capacity = {}", settings.queue_capacity);
    println!();

    println!("commands ({}):", commands.len());
    for command in commands {
        println!("  - {}", command.command_line());
        println!("      args: {:?}", command.original_args());
    }

    debug!("dry-run complete (no execution)");
}
