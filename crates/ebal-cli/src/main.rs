use clap::Parser;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

use ebal_cli::cli::{Cli, Commands};

mod commands;
mod profiles;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Commands::Dispatch {
            out,
            periods,
            bus,
            from,
            smooth,
            common,
        } => commands::dispatch::handle(out, *periods, bus, from.as_deref(), *smooth, common),
        Commands::Storage {
            out,
            periods,
            from,
            smooth,
            common,
        } => commands::storage::handle(out, *periods, from, *smooth, common),
        Commands::Chp {
            out,
            periods,
            steps,
            common,
        } => commands::chp::handle(out, *periods, *steps, common),
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}
