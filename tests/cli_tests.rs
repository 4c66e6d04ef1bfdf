// Integration tests for the stackecho demo binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_demo_traces_main_thread() {
    let mut cmd = Command::cargo_bin("stackecho").unwrap();
    cmd.args(["--omit-time", "--source-width", "0", "-d", "1"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("trace> "))
        .stdout(predicate::str::contains("Alice: [ten]"))
        .stdout(predicate::str::contains("The end!"));
}

#[test]
fn test_demo_prints_new_frames_with_callout() {
    let output = Command::cargo_bin("stackecho")
        .unwrap()
        .args(["--omit-time", "--source-width", "0", "-d", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout
        .lines()
        .find(|line| line.contains("Start"))
        .expect("no Start line");
    assert!(start.starts_with("trace> +"), "{}", start);
}

#[test]
fn test_json_snapshot() {
    let output = Command::cargo_bin("stackecho")
        .unwrap()
        .args(["--omit-time", "-d", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"top_message\""));
    assert!(stdout.contains("\"history\""));
    assert!(stdout.contains("The end!"));
}

#[test]
fn test_worker_threads_switch() {
    let mut cmd = Command::cargo_bin("stackecho").unwrap();
    cmd.args(["--omit-time", "-d", "1", "-t", "2", "--switch-print", "stack"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("thread switched"))
        .stdout(predicate::str::contains("worker 1"));
}

#[test]
fn test_lock_thread_hides_workers() {
    let mut cmd = Command::cargo_bin("stackecho").unwrap();
    cmd.args(["--omit-time", "-d", "1", "--threads", "2", "--lock-thread"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Start"))
        .stdout(predicate::str::contains("The end!"))
        .stdout(predicate::str::contains("worker").not());
}

#[test]
fn test_zero_history_limit_rejected() {
    let mut cmd = Command::cargo_bin("stackecho").unwrap();
    cmd.args(["--history-limit", "0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid tracer configuration"));
}

#[test]
fn test_capacity_above_maximum_rejected() {
    let mut cmd = Command::cargo_bin("stackecho").unwrap();
    cmd.args(["--capacity", "100000"]);

    cmd.assert().failure();
}
