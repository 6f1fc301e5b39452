//! CLI for netdev — per-interface throughput, saturation and utilization.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "netdev")]
#[command(about = "netdev — network interface throughput and link utilization")]
#[command(version = netdev_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one raw counter snapshot of the local machine
    Snapshot {
        /// JSON config file (paths, queries, deny-list); defaults apply to missing fields
        #[arg(long)]
        config: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll interfaces and print per-second rates and utilization
    Watch {
        /// JSON config file (paths, queries, deny-list); defaults apply to missing fields
        #[arg(long)]
        config: Option<String>,

        /// Poll interval (e.g. "500ms", "1s", "2m")
        #[arg(long, default_value = "1s")]
        interval: String,

        /// Stop after this many reports; default: until Ctrl+C
        #[arg(long)]
        count: Option<usize>,

        /// Print each report as one JSON line
        #[arg(long)]
        json: bool,

        /// PostgreSQL connection string of a host exposing the telemetry extension.
        /// Local hosts are read from procfs directly.
        #[arg(long)]
        dsn: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot { config, json } => commands::snapshot::run(config.as_deref(), json),
        Commands::Watch {
            config,
            interval,
            count,
            json,
            dsn,
        } => commands::watch::run(
            config.as_deref(),
            &interval,
            count,
            json,
            dsn.as_deref(),
        ),
    }
}
