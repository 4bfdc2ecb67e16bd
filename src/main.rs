use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pfguard::lifecycle::Supervisor;
use pfguard::pfctl::PfctlTable;

#[derive(Parser)]
#[command(name = "pfguard")]
#[command(about = "Health-check driven manager for pf loadbalancer tables", long_about = None)]
struct Cli {
    /// Location of the configuration file
    #[arg(short = 'c', long, default_value = "/etc/pfguard/pfguard.toml")]
    config: PathBuf,

    /// Be verbose, e.g. show every healthcheck attempt
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Do not perform any pfctl actions
    #[arg(short = 'n', long)]
    no_action: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pfguard=debug" } else { "pfguard=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pfguard starting");

    let table = Arc::new(PfctlTable::new(cli.no_action));
    let supervisor = Supervisor::new(cli.config, table);
    supervisor.run().await?;

    tracing::info!("finished, good bye");
    Ok(())
}
