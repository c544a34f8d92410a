//! Siteforge - LLM-powered responsive website generation server.

use anyhow::Result;
use siteforge::cli::Cli;
use siteforge::config::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse_args();
    cli.run().await
}
