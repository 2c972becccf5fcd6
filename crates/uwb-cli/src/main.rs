//! UWB Positioning Driver - Main Entry Point

use clap::Parser;
use uwb_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
