//! Integration tests for startup configuration validation.
//!
//! These tests verify the behavior of probe-binary validation through
//! the built binary's --check-config mode.

use tempfile::NamedTempFile;

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_fleet-ping-exporter"))
}

#[test]
fn test_check_config_fails_for_missing_probe_binary() {
    let output = std::process::Command::new(binary_path())
        .args([
            "--no-config",
            "--probe-path",
            "/nonexistent/fleetctl",
            "--check-config",
        ])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(
        stdout.contains("does not exist") || stderr.contains("does not exist"),
        "Expected error about missing probe binary, got stdout: '{}', stderr: '{}'",
        stdout,
        stderr
    );
}

#[test]
fn test_check_config_fails_for_directory_probe_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let output = std::process::Command::new(binary_path())
        .args(["--no-config", "--check-config"])
        .arg("--probe-path")
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(
        stdout.contains("not a regular file") || stderr.contains("not a regular file"),
        "Expected error about non-file probe path, got stdout: '{}', stderr: '{}'",
        stdout,
        stderr
    );
}

#[test]
fn test_check_config_succeeds_for_existing_probe_binary() {
    let probe = NamedTempFile::new().expect("Failed to create temp file");

    let output = std::process::Command::new(binary_path())
        .args(["--no-config", "--check-config"])
        .arg("--probe-path")
        .arg(probe.path())
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.contains("Configuration is valid"),
        "Expected validation success, got stdout: '{}'",
        stdout
    );
}

#[test]
fn test_show_config_reports_effective_values() {
    let output = std::process::Command::new(binary_path())
        .args([
            "--no-config",
            "--show-config",
            "--ping-timeout",
            "7",
            "--config-format",
            "yaml",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.contains("ping_timeout: '7'") || stdout.contains("ping_timeout: \"7\""),
        "Expected effective ping timeout in output, got: '{}'",
        stdout
    );
}
