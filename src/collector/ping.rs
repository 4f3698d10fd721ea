//! Ping collector: probes one fleet node via the orchestration CLI.
//!
//! Each instance is bound to a single target identity and lives for one
//! scrape. The probe's exit status becomes the status gauge; the first
//! `time=<number> <unit>` occurrence in stdout becomes the latency gauge.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use regex::Regex;
use tracing::{debug, error};

use crate::collector::{gauge_family, Collector, COLLECT_DURATION, COLLECT_ERROR, NAMESPACE};
use crate::config::CollectorSettings;
use crate::probe::ProbeRunner;

static PING_STATUS: Lazy<Desc> = Lazy::new(|| {
    Desc::new(
        format!("{}_ping_status", NAMESPACE),
        "Fleet ping status, 1=successful 0=not successful".to_string(),
        Vec::new(),
        HashMap::new(),
    )
    .expect("valid descriptor")
});

static PING_SECONDS: Lazy<Desc> = Lazy::new(|| {
    Desc::new(
        format!("{}_ping_seconds", NAMESPACE),
        "Fleet ping time in seconds".to_string(),
        Vec::new(),
        HashMap::new(),
    )
    .expect("valid descriptor")
});

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=([0-9.]+) ([a-z]+)").expect("valid regex"));

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// Typed result of parsing one probe's output.
#[derive(Debug, Clone, PartialEq)]
pub struct PingObservation {
    /// 1 if the probe process exited successfully, 0 otherwise.
    pub status: u8,
    /// Round-trip time in seconds, when the output reported one.
    pub latency_seconds: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
#[error("Error parsing time from '{output}': {source}")]
pub struct PingParseError {
    /// Probe output with line breaks normalized to single spaces.
    output: String,
    source: std::num::ParseFloatError,
}

/// Normalizes line breaks to single spaces for one-line log records.
fn flatten_output(text: &str) -> String {
    LINE_BREAK.replace_all(text, " ").into_owned()
}

/// Extracts a binary status and an optional latency from raw probe output.
///
/// Status comes from the exit status alone. The latency is the first
/// `time=<number> <unit>` match; no match means no latency sample, which
/// is not an error. A match that fails float conversion is an error.
/// Only the `ms` unit is converted (to seconds); every other unit passes
/// through unchanged.
pub fn parse_ping_output(stdout: &str, succeeded: bool) -> Result<PingObservation, PingParseError> {
    let status = u8::from(succeeded);
    let mut latency_seconds = None;

    if let Some(caps) = TIME_PATTERN.captures(stdout) {
        let value: f64 = caps[1].parse().map_err(|source| PingParseError {
            output: flatten_output(stdout),
            source,
        })?;
        latency_seconds = Some(match &caps[2] {
            "ms" => value / 1000.0,
            _ => value,
        });
    }

    Ok(PingObservation {
        status,
        latency_seconds,
    })
}

/// Collector probing one node via the CLI's `ping` subcommand.
pub struct PingCollector {
    identity: String,
    probe_path: PathBuf,
    timeout: String,
    runner: Arc<dyn ProbeRunner>,
}

impl PingCollector {
    pub fn new(identity: &str, settings: &CollectorSettings, runner: Arc<dyn ProbeRunner>) -> Self {
        Self {
            identity: identity.to_string(),
            probe_path: settings.probe_path.clone(),
            timeout: settings.ping_timeout.clone(),
            runner,
        }
    }
}

impl Collector for PingCollector {
    fn describe(&self) -> Vec<&Desc> {
        vec![&*PING_STATUS, &*PING_SECONDS]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        debug!(identity = %self.identity, "Collecting ping metric");
        let collect_start = Instant::now();

        let output = self
            .runner
            .run(&self.probe_path, "ping", &self.timeout, &self.identity);
        if !output.succeeded {
            error!(
                identity = %self.identity,
                "PING failed: {}",
                flatten_output(&output.stdout)
            );
        }

        let mut families = Vec::with_capacity(4);
        let mut collect_error = 0.0;
        match parse_ping_output(&output.stdout, output.succeeded) {
            Ok(observation) => {
                families.push(gauge_family(&PING_STATUS, f64::from(observation.status), &[]));
                if let Some(latency) = observation.latency_seconds {
                    families.push(gauge_family(&PING_SECONDS, latency, &[]));
                }
            }
            Err(e) => {
                // A failed probe is a valid observation; only a latency
                // parse failure counts as a collection error.
                error!(identity = %self.identity, "{}", e);
                families.push(gauge_family(
                    &PING_STATUS,
                    if output.succeeded { 1.0 } else { 0.0 },
                    &[],
                ));
                collect_error = 1.0;
            }
        }

        families.push(gauge_family(
            &COLLECT_DURATION,
            collect_start.elapsed().as_secs_f64(),
            &["ping"],
        ));
        families.push(gauge_family(&COLLECT_ERROR, collect_error, &["ping"]));
        families
    }
}
