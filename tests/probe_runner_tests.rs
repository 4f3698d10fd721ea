//! Integration tests for the system probe runner.
//!
//! These tests point the runner at a small shell script that echoes its
//! argument vector, verifying the exact CLI grammar the orchestration
//! tool expects and the capture/exit-status behavior.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use fleet_ping_exporter::probe::{ProbeRunner, SystemProbeRunner};

/// Writes an executable script into `dir` and returns its path.
fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark script executable");
    path
}

#[test]
fn test_runner_passes_arguments_in_cli_grammar_order() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let echo_argv = script(&dir, "fleetctl", "#!/bin/sh\necho \"$@\"\n");

    let output = SystemProbeRunner.run(&echo_argv, "ping", "3", "node01");

    assert!(output.succeeded);
    assert_eq!(output.stdout.trim_end(), "ping --timeout 3 -I node01");
}

#[test]
fn test_runner_reports_failure_exit_and_keeps_stdout() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let failing = script(
        &dir,
        "fleetctl",
        "#!/bin/sh\necho 'No responses received'\nexit 1\n",
    );

    let output = SystemProbeRunner.run(&failing, "ping", "1", "node02");

    assert!(!output.succeeded);
    assert!(output.stdout.contains("No responses received"));
}

#[test]
fn test_runner_does_not_capture_stderr() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let noisy = script(
        &dir,
        "fleetctl",
        "#!/bin/sh\necho 'noise' >&2\necho 'node03 time=1.5 ms'\n",
    );

    let output = SystemProbeRunner.run(&noisy, "ping", "1", "node03");

    assert!(output.succeeded);
    assert!(output.stdout.contains("node03 time=1.5 ms"));
    assert!(!output.stdout.contains("noise"));
}

#[test]
fn test_runner_maps_spawn_failure_to_unsuccessful_probe() {
    let output = SystemProbeRunner.run(
        &PathBuf::from("/nonexistent/fleetctl"),
        "ping",
        "1",
        "node04",
    );

    assert!(!output.succeeded);
    assert!(output.stdout.is_empty());
}
