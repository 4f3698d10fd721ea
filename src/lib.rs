//! Fleet Ping Exporter Library
//!
//! Prometheus exporter for the runtime health of nodes managed by a
//! distributed fleet-orchestration agent. Each scrape names a target
//! node; the exporter runs the orchestration CLI's `ping` subcommand
//! against it and republishes the result as metric samples.
//!
//! # Features
//!
//! - **Collector plugin framework**: an explicit [`collector::CollectorRegistry`]
//!   of named collector kinds with per-kind enable/disable gating
//! - **Per-request instantiation**: collectors are bound to one target
//!   identity and live for a single scrape
//! - **Injectable probe execution**: subprocess invocation goes through
//!   the [`probe::ProbeRunner`] trait so tests run without a real binary

pub mod cli;
pub mod collector;
pub mod config;
pub mod handlers;
pub mod probe;
pub mod state;

// Re-export main types for convenience
pub use collector::{default_collector_registry, Collector, CollectorRegistry, CollectorSet};
pub use config::{collector_settings, Config};
pub use probe::{ProbeOutput, ProbeRunner, SystemProbeRunner};
pub use state::{AppState, SharedState};
