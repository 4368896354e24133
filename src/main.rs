//! Flashsale CLI

use std::io;

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();

    flashsale::observability::init_logging(&cli.logging())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    cli.run(&mut handle)
}
