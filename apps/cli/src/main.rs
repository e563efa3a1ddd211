use anyhow::Result;
use blocks_cli::models::args::Cli;
use blocks_logger::{LevelFilter, Logger};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let _logger = Logger::builder().name("blocks").level(level).init()?;

    blocks_cli::run(cli)
}
