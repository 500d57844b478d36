use clap::Parser;
use tracing_subscriber::EnvFilter;

mod ani;
mod cli;
mod core;
mod dotplot;
mod gfa;
mod importer;
mod orchestrator;
mod parsing;
mod queue;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("assembly_curator=debug,info")
    } else {
        EnvFilter::new("assembly_curator=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Process(args) => cli::process::run(args)?,
        cli::Commands::Enqueue(args) => cli::enqueue::run(args)?,
        cli::Commands::Worker(args) => cli::worker::run(args)?,
        cli::Commands::Status(args) => cli::status::run(args)?,
    }

    Ok(())
}
