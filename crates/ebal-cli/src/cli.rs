use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Least-cost dispatch of a multi-fuel power plant fleet
    Dispatch {
        /// Output PNG path
        #[arg(short, long, default_value = "dispatch_bel.png")]
        out: PathBuf,
        /// Number of hourly periods to optimize
        #[arg(long, default_value_t = 168)]
        periods: usize,
        /// Bus whose balance is plotted
        #[arg(long, default_value = "bel")]
        bus: String,
        /// Window start, e.g. 2012-01-03 or 2012-01-03T12:00
        #[arg(long)]
        from: Option<String>,
        /// Draw smoothed lines instead of steps
        #[arg(long)]
        smooth: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Wind/pv/gas system sizing a battery storage by investment
    Storage {
        /// Output PNG path
        #[arg(short, long, default_value = "storage_electricity.png")]
        out: PathBuf,
        /// Number of hourly periods to optimize
        #[arg(long, default_value_t = 1344)]
        periods: usize,
        /// Window start of the plotted slice
        #[arg(long, default_value = "2012-02-15")]
        from: String,
        /// Draw smoothed lines instead of steps
        #[arg(long)]
        smooth: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Combined heat and power plant feeding twin buses
    Chp {
        /// Base PNG path; `_electricity` / `_heat` suffixes are appended
        #[arg(short, long, default_value = "chp.png")]
        out: PathBuf,
        /// Number of hourly periods to optimize
        #[arg(long, default_value_t = 192)]
        periods: usize,
        /// Draw stepwise instead of the default smoothed lines
        #[arg(long)]
        steps: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Options shared by every scenario.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// CSV file with wind/pv/demand_el[/demand_th] profile columns;
    /// built-in synthetic profiles are used when absent
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Window end (inclusive)
    #[arg(long)]
    pub to: Option<String>,
    /// Write a JSON summary (objective, flow sums, scalars) to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}
