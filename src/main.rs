mod cli;
mod config;
mod convert;
mod forecast_cmd;
mod inventory_cmd;
mod logging;
mod report;
mod skill_cmd;
mod verify_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::SkillcastConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = SkillcastConfig::load(&cli.config)?;
    match cli.command {
        Command::Skill(args) => skill_cmd::run(args, &config),
        Command::Forecast(args) => forecast_cmd::run(args, &config),
        Command::Verify(args) => verify_cmd::run(args, &config),
        Command::Inventory(args) => inventory_cmd::run(args, &config),
    }
}
