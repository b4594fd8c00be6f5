mod commands;

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sentinel_cli::args::{ConstraintArgs, DataArgs, ObjectiveArg, WeightArgs};
use sentinel_cli::output::OutputFormat;
use sentinel_lib::SentinelConfig;

use commands::paths::PathsCommandArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Maritime route risk scoring and rerouting")]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank rerouting alternatives between two ports.
    Reroute {
        /// Origin port id, name or country code.
        #[arg(long = "from")]
        from: String,
        /// Destination port id, name or country code.
        #[arg(long = "to")]
        to: String,
        #[command(flatten)]
        constraints: ConstraintArgs,
    },
    /// List ranked paths between two ports under a single objective.
    Paths {
        /// Origin port id, name or country code.
        #[arg(long = "from")]
        from: String,
        /// Destination port id, name or country code.
        #[arg(long = "to")]
        to: String,
        /// Quantity to minimise.
        #[arg(long, value_enum, default_value_t = ObjectiveArg::Balanced)]
        objective: ObjectiveArg,
        #[command(flatten)]
        weights: WeightArgs,
        #[command(flatten)]
        constraints: ConstraintArgs,
        /// Maximum number of paths to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Audit the resilience of a route given as an ordered list of ports.
    Resilience {
        /// Ports visited by the route, in order.
        #[arg(required = true, num_args = 2..)]
        ports: Vec<String>,
    },
    /// Show the chokepoint risk snapshot.
    Chokepoints,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = SentinelConfig::resolve(cli.data.to_overrides())
        .context("failed to resolve configuration")?;
    let graph = config
        .build_graph()
        .context("failed to load reference data")?;

    match cli.command {
        Command::Reroute {
            from,
            to,
            constraints,
        } => commands::reroute::handle_reroute(
            &graph,
            &constraints.to_request(&from, &to),
            cli.format,
        ),
        Command::Paths {
            from,
            to,
            objective,
            weights,
            constraints,
            limit,
        } => {
            let args = PathsCommandArgs {
                from,
                to,
                options: constraints.to_search_options(objective.to_objective(&weights), limit),
            };
            commands::paths::handle_paths(&graph, &args, cli.format)
        }
        Command::Resilience { ports } => {
            commands::resilience::handle_resilience(&graph, &ports, cli.format)
        }
        Command::Chokepoints => commands::chokepoints::handle_chokepoints(&graph, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
