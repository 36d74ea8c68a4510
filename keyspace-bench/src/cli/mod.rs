//! Command-line interface
//!
//! - `run`: run the invalidation scenarios and print a report
//! - `stats`: print the store's memory statistics

pub mod run;
pub mod stats;

use anyhow::anyhow;
use clap::{Parser, Subcommand};

use keyspace_common::logging::{LogConfig, LogFormat};
use keyspace_common::{open_store, KeyValueStore, StoreBackend};

/// Keyspace invalidation benchmark
#[derive(Parser)]
#[command(name = "keyspace-bench")]
#[command(about = "Compare flat, hashed and indexed group invalidation on a key-value store")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Log format (pretty, compact, json), overrides LOG_FORMAT
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Apply the logging flags on top of `base`
    pub fn log_config(&self, base: LogConfig) -> LogConfig {
        let mut config = base;
        if let Some(format) = &self.log_format {
            config = config.with_format(LogFormat::parse(format));
        }
        if self.verbose {
            config = config.with_level("debug");
        }
        config
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fill, invalidate and probe with each strategy
    Run(run::RunArgs),
    /// Print the store's memory statistics
    Stats(stats::StatsArgs),
}

/// `--redis-url` wins over `REDIS_URL`, which wins over the configured URL
pub(crate) fn resolve_redis_url(flag: Option<&str>, env: Option<&str>, configured: &str) -> String {
    flag.or(env).unwrap_or(configured).to_string()
}

/// Open the store, pointing at the URL when the server cannot be reached
pub(crate) fn connect(backend: StoreBackend, url: &str) -> anyhow::Result<Box<dyn KeyValueStore>> {
    open_store(backend, url).map_err(|err| {
        if err.is_connection() {
            anyhow!(err).context(format!("cannot reach the store at {} (is Redis running?)", url))
        } else {
            err.into()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_redis_url_precedence() {
        let configured = "redis://config:6379";
        assert_eq!(resolve_redis_url(None, None, configured), configured);
        assert_eq!(
            resolve_redis_url(None, Some("redis://env:6379"), configured),
            "redis://env:6379"
        );
        assert_eq!(
            resolve_redis_url(Some("redis://flag:6379"), Some("redis://env:6379"), configured),
            "redis://flag:6379"
        );
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "keyspace-bench",
            "run",
            "--preset",
            "lite",
            "--strategy",
            "flat",
            "--strategy",
            "indexed",
            "--format",
            "json",
            "--scan-mode",
            "scan",
            "--batch-size",
            "100",
            "--flush-first",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.preset.as_deref(), Some("lite"));
                assert_eq!(args.strategy.len(), 2);
                assert_eq!(args.batch_size, Some(100));
                assert!(args.flush_first);
            }
            Commands::Stats(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["keyspace-bench", "run", "--strategy", "sorted"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "keyspace-bench",
            "run",
            "--config",
            "bench.toml",
            "--preset",
            "lite",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_flags_override_base() {
        let cli = Cli::try_parse_from([
            "keyspace-bench",
            "stats",
            "--log-format",
            "json",
            "--verbose",
        ])
        .unwrap();
        let config = cli.log_config(LogConfig::default());
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");

        let quiet = Cli::try_parse_from(["keyspace-bench", "stats"]).unwrap();
        let base = LogConfig::default().with_format(LogFormat::Compact);
        let config = quiet.log_config(base);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_connect_failure_names_the_url() {
        let url = "redis://127.0.0.1:1";
        let err = match connect(StoreBackend::Redis, url) {
            Ok(_) => panic!("nothing should listen on port 1"),
            Err(err) => err,
        };
        assert!(err.to_string().contains(url), "{:#}", err);
    }
}
