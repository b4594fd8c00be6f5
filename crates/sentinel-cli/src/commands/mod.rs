// Handlers for CLI subcommands.
//
// Each module handles a single subcommand. main.rs parses arguments, builds the
// route graph once and dispatches here.

pub mod chokepoints;
pub mod paths;
pub mod reroute;
pub mod resilience;
