//! Metrics endpoint handler for Prometheus scraping.
//!
//! Each request names a target node via `?identity=<name>` (alias
//! `?host=<name>`), builds a fresh collector set bound to that identity,
//! registers it into a request-scoped registry, and serializes the
//! gathered samples in Prometheus text format.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::state::{AppState, SharedState};

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Query parameters accepted by the metrics endpoint.
#[derive(Debug, Deserialize)]
pub struct MetricsParams {
    pub identity: Option<String>,
    pub host: Option<String>,
}

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    MissingIdentity,
    CollectorSetup,
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        match self {
            MetricsError::MissingIdentity => (
                StatusCode::BAD_REQUEST,
                "'identity' parameter must be specified",
            )
                .into_response(),
            MetricsError::CollectorSetup => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to set up collectors",
            )
                .into_response(),
            MetricsError::EncodingFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response(),
        }
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state, params))]
pub async fn metrics_handler(
    State(state): State<SharedState>,
    Query(params): Query<MetricsParams>,
) -> Result<String, MetricsError> {
    debug!("Processing /metrics request");

    let identity = params
        .identity
        .or(params.host)
        .filter(|s| !s.is_empty())
        .ok_or(MetricsError::MissingIdentity)?;

    // Collection spawns a subprocess that may block for the full probe
    // timeout, so the whole scrape runs off the async worker threads.
    let scrape_state = state.clone();
    tokio::task::spawn_blocking(move || scrape(&scrape_state, &identity))
        .await
        .map_err(|e| {
            error!("Scrape task failed: {}", e);
            MetricsError::CollectorSetup
        })?
}

/// One full build → collect → encode pass for a single target identity.
fn scrape(state: &AppState, identity: &str) -> Result<String, MetricsError> {
    let registry = Registry::new();

    let set = state
        .collectors
        .build(identity, &state.settings)
        .map_err(|e| {
            error!("{}", e);
            MetricsError::CollectorSetup
        })?;
    set.register_into(&registry).map_err(|e| {
        error!("Failed to register collectors: {}", e);
        MetricsError::CollectorSetup
    })?;

    // Collection happens here, inside gather().
    let mut families = registry.gather();
    if state.exporter_metrics_enabled {
        families.extend(prometheus::gather());
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    encoder.encode(&families, &mut buffer).map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        MetricsError::EncodingFailed
    })?;

    String::from_utf8(buffer).map_err(|e| {
        error!("Metrics output is not valid UTF-8: {}", e);
        MetricsError::EncodingFailed
    })
}
