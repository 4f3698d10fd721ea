//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays a short
//! landing page pointing at the metrics endpoint.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");
    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Fleet Ping Exporter</title></head>
<body>
<h1>Fleet Ping Exporter</h1>
<p>Version {version} &mdash; up {uptime}</p>
<p><a href='/metrics?identity=example-node'>Metrics</a>
(requires an <code>identity</code> or <code>host</code> query parameter
naming the target node)</p>
</body>
</html>"#,
        version = version,
        uptime = uptime_str
    );

    Html(html)
}
