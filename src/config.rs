//! Configuration management for fleet-ping-exporter.
//!
//! This module handles loading, merging, and validating configuration from
//! files and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9306;
pub const DEFAULT_PROBE_PATH: &str = "/usr/local/bin/fleetctl";
pub const DEFAULT_PING_TIMEOUT: &str = "1";

/// Static startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Probe configuration
    #[serde(alias = "probe-path")]
    pub probe_path: Option<PathBuf>,
    /// Passed through to the ping subcommand verbatim, not validated here.
    #[serde(alias = "ping-timeout")]
    pub ping_timeout: Option<String>,

    // Collector enable flags, one per registered collector name
    #[serde(alias = "enable-ping-collector")]
    pub enable_ping_collector: Option<bool>,

    // Feature flags
    #[serde(alias = "enable-exporter-metrics")]
    pub enable_exporter_metrics: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            log_level: Some("info".into()),
            probe_path: Some(PathBuf::from(DEFAULT_PROBE_PATH)),
            ping_timeout: Some(DEFAULT_PING_TIMEOUT.to_string()),
            enable_ping_collector: None,
            enable_exporter_metrics: Some(true),
        }
    }
}

/// Settings consumed by the collector set builder.
///
/// Explicit structure instead of package-level mutable flag state: the
/// enablement map holds per-collector overrides, and an absent entry
/// means the kind's registered default applies.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub probe_path: PathBuf,
    pub ping_timeout: String,
    pub enabled: HashMap<String, bool>,
}

/// Derives collector settings from the resolved configuration.
pub fn collector_settings(config: &Config) -> CollectorSettings {
    let mut enabled = HashMap::new();
    if let Some(ping_enabled) = config.enable_ping_collector {
        enabled.insert("ping".to_string(), ping_enabled);
    }

    CollectorSettings {
        probe_path: config
            .probe_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROBE_PATH)),
        ping_timeout: config
            .ping_timeout
            .clone()
            .unwrap_or_else(|| DEFAULT_PING_TIMEOUT.to_string()),
        enabled,
    }
}

/// Validate effective config (used by --check-config and at startup).
///
/// The probe binary is static configuration: a missing binary does not
/// appear mid-run, so its absence is a fatal startup condition rather
/// than a per-request error.
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let probe_path = cfg
        .probe_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROBE_PATH));

    match fs::metadata(&probe_path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(format!(
            "Probe binary path {} is not a regular file",
            probe_path.display()
        )
        .into()),
        Err(_) => Err(format!(
            "Path {} for the probe binary does not exist",
            probe_path.display()
        )
        .into()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(probe_path) = &args.probe_path {
        config.probe_path = Some(probe_path.clone());
    }
    if let Some(timeout) = &args.ping_timeout {
        config.ping_timeout = Some(timeout.clone());
    }

    // Collector flags: CLI wins if provided
    if args.enable_ping_collector {
        config.enable_ping_collector = Some(true);
    }
    if args.disable_ping_collector {
        config.enable_ping_collector = Some(false);
    }

    if args.disable_exporter_metrics {
        config.enable_exporter_metrics = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/fleet-ping-exporter/config.yaml",
            "/etc/fleet-ping-exporter/config.yml",
            "/etc/fleet-ping-exporter/config.json",
            "./fleet-ping-exporter.yaml",
            "./fleet-ping-exporter.yml",
            "./fleet-ping-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
