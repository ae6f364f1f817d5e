//! Space Lab - Memecoin Launchpad Backend
//!
//! Token launches, Jupiter trading and trending feeds for Solana.

use anyhow::Result;
use clap::Parser;

use space_lab::adapters::cli::{self, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config/default.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    cli::execute(app).await
}
