//! Chokepoint snapshot command.

use anyhow::Result;

use sentinel_lib::{get_chokepoint_risks, ChokepointTable, Render, RouteGraph};

use sentinel_cli::output::{emit, OutputFormat};

pub fn handle_chokepoints(graph: &RouteGraph, format: OutputFormat) -> Result<()> {
    let snapshot = get_chokepoint_risks(graph);
    emit(format, &snapshot, |mode| ChokepointTable(&snapshot).render(mode))
}
