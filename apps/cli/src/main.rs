//! notionsite CLI: build static site collections from Notion databases.
//!
//! Queries the configured projects, subscriptions and members databases and
//! writes normalized JSON collections plus downloaded icons and logos.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
