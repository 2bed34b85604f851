//! Afterscope CLI - headless front end for the light-curve explorer.

mod commands;
mod model;
mod script;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "afterscope")]
#[command(author, version, about = "Afterglow light-curve explorer", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a session's parameters and controls
    Params(commands::params::ParamsArgs),

    /// List a session's bands
    Series(commands::series::SeriesArgs),

    /// Evaluate every band once and print the frame
    Eval(commands::eval::EvalArgs),

    /// Apply a JSON script of control events
    Replay(commands::replay::ReplayArgs),

    /// Step one slider across its range
    Sweep(commands::sweep::SweepArgs),

    /// Show, validate and export session files
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Params(args) => commands::params::run(args),
        Commands::Series(args) => commands::series::run(args),
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Sweep(args) => commands::sweep::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
