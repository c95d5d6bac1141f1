// tests/run.rs

mod common;
use crate::common::builders::CommandsBuilder;
use crate::common::{init_tracing, with_timeout};

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use fanexec::cli::CliArgs;
use fanexec::config::RunSettings;
use fanexec::errors::FanexecError;
use fanexec::{RunSummary, execute, run};

fn input_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn args_for(file: &NamedTempFile, cmd: &str) -> CliArgs {
    CliArgs {
        cmd: Some(cmd.to_string()),
        input: Some(file.path().display().to_string()),
        ..CliArgs::default()
    }
}

#[tokio::test]
async fn child_failures_do_not_fail_the_run() {
    init_tracing();

    let file = input_file("0\n3\n0\n");
    let summary = with_timeout(run(args_for(&file, "exit {{.Arg}}"))).await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            launched: 3,
            failed: 1,
            stream_errors: 0
        }
    );
}

#[tokio::test]
async fn empty_input_runs_nothing() {
    let file = input_file("\n\n");
    let summary = with_timeout(run(args_for(&file, "echo {{.Arg}}"))).await.unwrap();
    assert_eq!(summary, RunSummary::default());
}

#[tokio::test]
async fn dry_run_launches_nothing() {
    let file = input_file("a\nb\n");
    let args = CliArgs {
        dry_run: true,
        ..args_for(&file, "touch /nonexistent-dir/{{.Arg}}")
    };

    let summary = with_timeout(run(args)).await.unwrap();
    assert_eq!(summary.launched, 0);
}

#[tokio::test]
async fn bad_template_is_fatal() {
    let file = input_file("a\n");
    let result = with_timeout(run(args_for(&file, "echo {{.Arg"))).await;
    assert!(matches!(result, Err(FanexecError::TemplateSyntax { .. })));
}

#[tokio::test]
async fn binding_failure_is_fatal_before_launch() {
    let file = input_file("a,1\nb,2\n");
    let result = with_timeout(run(args_for(&file, "echo {{index .Args 2}}"))).await;
    assert!(matches!(
        result,
        Err(FanexecError::TemplateBinding { index: 0, .. })
    ));
}

#[tokio::test]
async fn launch_failure_is_reported_after_started_commands_finish() {
    let args = CliArgs {
        exec_mode: Some(fanexec::types::ExecMode::Direct),
        ..CliArgs::default()
    };
    let settings = RunSettings::resolve(&args, None).unwrap();

    let commands = CommandsBuilder::new()
        .with("ok", "true")
        .with("bad", "fanexec-no-such-binary")
        .build();

    let cancel = CancellationToken::new();
    let result = with_timeout(execute(commands, &settings, &cancel)).await;
    assert!(matches!(result, Err(FanexecError::LaunchError { .. })));
}

#[test]
fn binary_reads_records_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_fanexec"))
        .args(["--cmd", "echo hi-{{.Arg}}", "--input", "-"])
        .current_dir(dir.path())
        .env("FANEXEC_LOG", "error")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(b"h1\nh2\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let mut lines: Vec<String> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    assert_eq!(lines, vec!["[h1 (stdout)] hi-h1", "[h2 (stdout)] hi-h2"]);
}
