//! SWE CLI - compare Snow-17 and SWANN snow water equivalent over CBRFC zones.

use clap::Parser;
use std::path::PathBuf;
use swe_cmd::PipelineConfig;

#[derive(Parser)]
#[command(
    name = "swe-cli",
    version,
    about = "Snow water equivalent zone comparison toolkit"
)]
struct Cli {
    /// JSON pipeline config (defaults apply when omitted)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: swe_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    log::debug!("Pipeline config: {:?}", config);
    swe_cmd::run(cli.command, &config)
}
