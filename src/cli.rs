//! CLI arguments for fleet-ping-exporter.
//!
//! This module defines the command-line interface structure using the clap
//! library, including server, configuration, and collector flags.

use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "fleet-ping-exporter",
    about = "Prometheus exporter for fleet-orchestration node health",
    long_about = "Prometheus exporter for fleet-orchestration node health.\n\n\
                  Each scrape names a managed node via ?identity=<name>; the exporter runs \
                  the orchestration CLI's ping subcommand against that node and republishes \
                  status, latency, duration and error samples.",
    author = "Michael Moll <exporter@herakles.now>",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Path to the orchestration CLI used for probes
    #[arg(long)]
    pub probe_path: Option<PathBuf>,

    /// Timeout passed through to the ping subcommand
    #[arg(long)]
    pub ping_timeout: Option<String>,

    /// Enable the ping collector (registered default: enabled)
    #[arg(long, conflicts_with = "disable_ping_collector")]
    pub enable_ping_collector: bool,

    /// Disable the ping collector
    #[arg(long, conflicts_with = "enable_ping_collector")]
    pub disable_ping_collector: bool,

    /// Exclude process-level metrics about the exporter itself
    #[arg(long)]
    pub disable_exporter_metrics: bool,
}
