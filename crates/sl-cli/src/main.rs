//! Sluice CLI - LLM-driven SQL retrieval and ingestion

use clap::Parser;

mod cli;
mod commands;
mod context;
mod logging;

use cli::Cli;
use commands::common::ExitCode;
use commands::{ask, check, clear, ingest, schema};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Ask(args) => ask::execute(args, &cli.global).await,
        cli::Commands::Ingest(args) => ingest::execute(args, &cli.global).await,
        cli::Commands::Schema(args) => schema::execute(args, &cli.global).await,
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
        cli::Commands::Clear(args) => clear::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code as u8),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::FAILURE
            }
        },
    }
}
