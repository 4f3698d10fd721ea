//! Application state management for the exporter.
//!
//! The collector registry and settings are populated once at startup and
//! never mutated afterwards, so handlers share them without locking.

use std::sync::Arc;
use std::time::Instant;

use crate::collector::CollectorRegistry;
use crate::config::CollectorSettings;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// Registered collector kinds, read-only during serving.
    pub collectors: CollectorRegistry,
    /// Probe path, timeout and enablement overrides.
    pub settings: CollectorSettings,
    /// Whether scrape responses include process-level exporter metrics.
    pub exporter_metrics_enabled: bool,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
