/*
 * Responsibility
 * - Parse flags, start the tokio runtime
 * - Call app::run() (no logic here)
 */
use anyhow::Result;
use clap::Parser;

use api_scaffold::{app, config::Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    app::run(cli).await
}
