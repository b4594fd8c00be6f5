//! Rerouting alternatives command.

use anyhow::Result;
use tracing::warn;

use sentinel_lib::{find_rerouting_alternatives, RerouteRequest, Render, RouteGraph};

use sentinel_cli::output::{emit, OutputFormat};

pub fn handle_reroute(graph: &RouteGraph, request: &RerouteRequest, format: OutputFormat) -> Result<()> {
    let report = find_rerouting_alternatives(graph, request);
    for matched in [&report.from, &report.to] {
        if !matched.is_resolved() {
            warn!(port = %matched.canonical_id, "unknown port");
        }
    }
    emit(format, &report, |mode| report.render(mode))
}
