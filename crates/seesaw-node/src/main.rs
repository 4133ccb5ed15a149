//! Seesaw pool node entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Leveraged two-sided pool node with a simulated price feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SEESAW_CONFIG).
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    seesaw_node::init_logging();
    info!("starting seesaw node v{}", env!("CARGO_PKG_VERSION"));

    let config = seesaw_node::NodeConfig::load(args.config)?;
    info!(pools = config.pools.len(), "configuration loaded");

    let mut app = seesaw_node::Application::new(config)?;
    app.run().await?;

    Ok(())
}
