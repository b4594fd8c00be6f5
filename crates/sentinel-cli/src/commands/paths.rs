//! Ranked path search command.

use anyhow::Result;
use tracing::warn;

use sentinel_lib::{find_paths, PortNormalizer, Render, RouteGraph, RouteList, SearchOptions};

use sentinel_cli::output::{emit, OutputFormat};

/// Arguments for the paths command after objective resolution.
#[derive(Debug, Clone)]
pub struct PathsCommandArgs {
    pub from: String,
    pub to: String,
    pub options: SearchOptions,
}

pub fn handle_paths(graph: &RouteGraph, args: &PathsCommandArgs, format: OutputFormat) -> Result<()> {
    let from = graph.normalize(&args.from);
    let to = graph.normalize(&args.to);
    for matched in [&from, &to] {
        if !matched.is_resolved() {
            warn!(port = %matched.canonical_id, "unknown port");
        }
    }

    let routes = find_paths(graph, &from.canonical_id, &to.canonical_id, &args.options);
    emit(format, &routes, |mode| RouteList(&routes).render(mode))
}
