//! Subprocess execution for diagnostic probes.
//!
//! Collectors never spawn processes directly; they go through the
//! [`ProbeRunner`] trait so tests can substitute a canned-output runner
//! without touching a real binary.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::error;

/// Captured result of one probe invocation.
#[derive(Debug, Clone)]
pub struct ProbeOutput {
    /// Raw standard output of the probe. Standard error is discarded.
    pub stdout: String,
    /// Whether the process exited with a success status.
    pub succeeded: bool,
}

/// Capability for running the orchestration CLI against a target node.
pub trait ProbeRunner: Send + Sync {
    fn run(&self, binary: &Path, subcommand: &str, timeout: &str, identity: &str) -> ProbeOutput;
}

/// Runner that spawns the real orchestration CLI.
pub struct SystemProbeRunner;

impl ProbeRunner for SystemProbeRunner {
    fn run(&self, binary: &Path, subcommand: &str, timeout: &str, identity: &str) -> ProbeOutput {
        // Argument order follows the CLI's grammar: <bin> ping --timeout <t> -I <identity>
        let result = Command::new(binary)
            .arg(subcommand)
            .arg("--timeout")
            .arg(timeout)
            .arg("-I")
            .arg(identity)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match result {
            Ok(output) => ProbeOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                succeeded: output.status.success(),
            },
            Err(e) => {
                error!("Failed to spawn {}: {}", binary.display(), e);
                ProbeOutput {
                    stdout: String::new(),
                    succeeded: false,
                }
            }
        }
    }
}
