//! keyspace-bench CLI
//!
//! - `run`: fill, invalidate and probe with each strategy, then report
//! - `stats`: print the store's memory statistics

use anyhow::Result;
use clap::Parser;

use keyspace_bench::cli::{Cli, Commands};
use keyspace_common::logging::{init_logging, LogConfig};

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_logging(cli.log_config(LogConfig::from_env().with_app_name("keyspace-bench")))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Run(args) => {
            if !keyspace_bench::cli::run::execute(args)? {
                std::process::exit(1);
            }
        }
        Commands::Stats(args) => {
            keyspace_bench::cli::stats::execute(args)?;
        }
    }

    Ok(())
}
