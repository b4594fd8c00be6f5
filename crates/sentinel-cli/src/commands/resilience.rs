//! Resilience audit command.

use anyhow::Result;
use tracing::info;

use sentinel_lib::{analyze_route_resilience, PortNormalizer, Render, RouteGraph};

use sentinel_cli::output::{emit, OutputFormat};

pub fn handle_resilience(graph: &RouteGraph, ports: &[String], format: OutputFormat) -> Result<()> {
    let path: Vec<String> = ports
        .iter()
        .map(|input| {
            let matched = graph.normalize(input);
            if matched.is_resolved() && !matched.canonical_id.eq_ignore_ascii_case(input.trim()) {
                info!(input = %input, port = %matched.canonical_id, "resolved port");
            }
            matched.canonical_id
        })
        .collect();

    let report = analyze_route_resilience(graph, &path);
    emit(format, &report, |mode| report.render(mode))
}
