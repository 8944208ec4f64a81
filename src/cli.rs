use std::path::PathBuf;

use clap::{Parser, Subcommand};

use skillcast_skill::BaseMonth;

/// Skillcast seasonal precipitation forecast skill.
#[derive(Parser)]
#[command(
    name = "skillcast",
    version,
    about = "Seasonal precipitation forecast skill evaluation and model selection"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file; built-in defaults apply when absent.
    #[arg(short, long, global = true, default_value = "skillcast.toml")]
    pub config: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Hindcast skill of every model for one start month.
    Skill(SkillArgs),
    /// Best model and calibrated forecast per lead.
    Forecast(ForecastArgs),
    /// Full 12 x 6 verification table of every model.
    Verify(PointArgs),
    /// List the discovered datasets.
    Inventory(InventoryArgs),
}

/// Location and output shared by the point subcommands.
#[derive(clap::Args)]
pub struct PointArgs {
    /// Latitude in degrees north.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees east (-180..180 or 0..360).
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `skill` subcommand.
#[derive(clap::Args)]
pub struct SkillArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Start month (1-12) or `auto` for the latest operational month.
    #[arg(short, long, default_value = "auto")]
    pub month: BaseMonth,
}

/// Arguments for the `forecast` subcommand.
#[derive(clap::Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Accepted for compatibility; the latest operational month is used.
    #[arg(short, long)]
    pub month: Option<u8>,
}

/// Arguments for the `inventory` subcommand.
#[derive(clap::Args)]
pub struct InventoryArgs {
    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
