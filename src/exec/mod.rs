// src/exec/mod.rs

//! Process execution layer.
//!
//! Turns generated command lines into running child processes using
//! `tokio::process::Command` and tracks them until they exit.
//!
//! - [`shell`] provides the `ShellProvider` trait: how a command line becomes
//!   a process (`sh -c` by default, direct argv as an alternative).
//! - [`launcher`] starts every command up front and wires its output pipes.
//! - [`command_set`] is the caller's handle over the launched processes:
//!   output streams, completion signal and exit failures.
//! - [`latch`] is the countdown latch behind the completion signal.

pub mod command_set;
pub mod latch;
pub mod launcher;
pub mod shell;

pub use command_set::{ChildProcess, CommandSet};
pub use latch::CountdownLatch;
pub use launcher::{Launched, launch_commands};
pub use shell::{DirectExec, ShellProvider, SystemShell, provider_for};
