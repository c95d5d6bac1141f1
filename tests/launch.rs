// tests/launch.rs
//
// These tests spawn real `sh` processes.

mod common;
use crate::common::builders::CommandsBuilder;
use crate::common::{init_tracing, rendered, sh, texts_for, with_timeout};

use tokio_util::sync::CancellationToken;

use fanexec::aggregate::TaggedLine;
use fanexec::errors::FanexecError;
use fanexec::exec::{DirectExec, Launched, launch_commands};
use fanexec::types::LabelStyle;

#[tokio::test]
async fn success_and_failure_are_tagged_and_collected() {
    init_tracing();

    let commands = CommandsBuilder::new()
        .with("P1", "printf 'a\\nb\\n'")
        .with("P2", "echo x >&2; exit 1")
        .build();

    let cancel = CancellationToken::new();
    let Launched { mut set, error } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);
    assert!(error.is_none());
    assert_eq!(set.len(), 2);

    let aggregation = set.aggregate(1000).unwrap();
    let failures = with_timeout(set.wait()).await;
    let (lines, read_errors) = with_timeout(aggregation.collect()).await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].command(), "echo x >&2; exit 1");
    assert_eq!(failures[0].exit_code(), Some(1));
    assert!(read_errors.is_empty());

    let mut out = rendered(&lines);
    out.sort();
    assert_eq!(out, vec!["[P1 (stdout)] a", "[P1 (stdout)] b", "[P2 (stderr)] x"]);
    assert_eq!(texts_for(&lines, "P1 (stdout)"), vec!["a", "b"]);
}

#[tokio::test]
async fn zero_commands_complete_immediately() {
    let cancel = CancellationToken::new();
    let Launched { mut set, error } = launch_commands(Vec::new(), &sh(), LabelStyle::First, &cancel);

    assert!(error.is_none());
    assert!(set.is_empty());
    assert!(set.aggregate(1000).is_none());
    assert!(with_timeout(set.wait()).await.is_empty());
}

#[tokio::test]
async fn total_lines_match_what_processes_wrote() {
    init_tracing();

    let mut builder = CommandsBuilder::new();
    for n in 1..=5 {
        builder = builder.with(
            &format!("p{n}"),
            &format!("i=1; while [ $i -le {n} ]; do echo line$i; i=$((i+1)); done"),
        );
    }

    let cancel = CancellationToken::new();
    let Launched { mut set, error } =
        launch_commands(builder.build(), &sh(), LabelStyle::First, &cancel);
    assert!(error.is_none());

    let aggregation = set.aggregate(4).unwrap();
    let (lines, _) = with_timeout(aggregation.collect()).await;
    assert!(with_timeout(set.wait()).await.is_empty());

    assert_eq!(lines.len(), 1 + 2 + 3 + 4 + 5);
    for n in 1..=5 {
        let expected: Vec<String> = (1..=n).map(|i| format!("line{i}")).collect();
        assert_eq!(texts_for(&lines, &format!("p{n} (stdout)")), expected);
    }
}

#[tokio::test]
async fn failures_are_recorded_in_exit_order() {
    let commands = CommandsBuilder::new()
        .with("slow", "sleep 0.5; exit 2")
        .with("fast", "exit 3")
        .build();

    let cancel = CancellationToken::new();
    let Launched { mut set, .. } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);
    let aggregation = set.aggregate(16).unwrap();

    let failures = with_timeout(set.wait()).await;
    let _ = aggregation.collect().await;

    let codes: Vec<Option<i32>> = failures.iter().map(|f| f.exit_code()).collect();
    assert_eq!(codes, vec![Some(3), Some(2)]);
}

#[tokio::test]
async fn launch_failure_keeps_already_running_processes() {
    init_tracing();

    let commands = CommandsBuilder::new()
        .with("one", "echo one")
        .with("missing", "fanexec-definitely-not-a-program --flag")
        .with("three", "echo three")
        .build();

    let cancel = CancellationToken::new();
    let Launched { mut set, error } =
        launch_commands(commands, &DirectExec, LabelStyle::First, &cancel);

    match error {
        Some(FanexecError::LaunchError { command, .. }) => {
            assert_eq!(command, "fanexec-definitely-not-a-program --flag")
        }
        other => panic!("Expected LaunchError, got: {:?}", other),
    }
    assert_eq!(set.len(), 1);
    assert_eq!(set.processes()[0].label(), "one");

    let aggregation = set.aggregate(16).unwrap();
    let failures = with_timeout(set.wait()).await;
    let (lines, _) = with_timeout(aggregation.collect()).await;

    assert!(failures.is_empty());
    assert_eq!(rendered(&lines), vec!["[one (stdout)] one"]);
}

#[tokio::test]
async fn cancellation_terminates_children_but_keeps_queued_output() {
    init_tracing();

    // One write per process, so seeing any line means all three are in the pipe.
    let commands = CommandsBuilder::new()
        .with("a", "printf 'a1\\na2\\na3\\n'; exec sleep 30")
        .with("b", "printf 'b1\\nb2\\nb3\\n'; exec sleep 30")
        .build();

    let cancel = CancellationToken::new();
    let Launched { mut set, error } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);
    assert!(error.is_none());

    let mut aggregation = set.aggregate(1000).unwrap();
    let mut seen = Vec::new();
    while !(seen.iter().any(|l: &TaggedLine| l.label == "a (stdout)")
        && seen.iter().any(|l: &TaggedLine| l.label == "b (stdout)"))
    {
        seen.push(with_timeout(aggregation.recv()).await.unwrap());
    }

    cancel.cancel();

    let failures = with_timeout(set.wait()).await;
    let (rest, _) = with_timeout(aggregation.collect()).await;
    let lines: Vec<TaggedLine> = seen.into_iter().chain(rest).collect();

    // Both were killed, so neither exited successfully.
    assert_eq!(failures.len(), 2);
    assert_eq!(texts_for(&lines, "a (stdout)"), vec!["a1", "a2", "a3"]);
    assert_eq!(texts_for(&lines, "b (stdout)"), vec!["b1", "b2", "b3"]);
}

#[tokio::test]
async fn cancelled_token_prevents_launching() {
    let commands = CommandsBuilder::new().with("x", "echo x").build();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let Launched { set, error } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);
    assert!(matches!(error, Some(FanexecError::LaunchError { .. })));
    assert!(set.is_empty());
    assert!(with_timeout(set.wait()).await.is_empty());
}

#[tokio::test]
async fn joined_labels_use_every_field() {
    let commands = CommandsBuilder::new()
        .with_args(&["web", "80"], "echo up")
        .with_args(&["web", "443"], "echo up")
        .build();

    let cancel = CancellationToken::new();
    let Launched { mut set, .. } = launch_commands(commands, &sh(), LabelStyle::Joined, &cancel);

    let aggregation = set.aggregate(16).unwrap();
    let (lines, _) = with_timeout(aggregation.collect()).await;
    with_timeout(set.wait()).await;

    let mut out = rendered(&lines);
    out.sort();
    assert_eq!(out, vec!["[web,443 (stdout)] up", "[web,80 (stdout)] up"]);
}

#[tokio::test]
async fn unread_output_does_not_block_completion() {
    // Writes far more than a pipe buffer holds; nobody reads it.
    let commands = CommandsBuilder::new()
        .with("noisy", "i=0; while [ $i -lt 100000 ]; do echo xxxxxxxxxxxxxxxxxxxxxxxx; i=$((i+1)); done")
        .build();

    let cancel = CancellationToken::new();
    let Launched { set, .. } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);

    // The process either finishes or dies of SIGPIPE; either way wait returns.
    let _ = with_timeout(set.wait()).await;
}

#[tokio::test]
async fn failure_count_reports_exits_before_completion() {
    let commands = CommandsBuilder::new()
        .with("fast", "exit 4")
        .with("slow", "sleep 1")
        .build();

    let cancel = CancellationToken::new();
    let Launched { set, error } = launch_commands(commands, &sh(), LabelStyle::First, &cancel);
    assert!(error.is_none());

    with_timeout(async {
        while set.failure_count() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await;
    assert_eq!(set.failure_count(), 1);

    let failures = with_timeout(set.wait()).await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].command(), "exit 4");
}
