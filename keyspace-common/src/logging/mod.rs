//! Logging setup for the keyspace benchmarks.
//!
//! Benchmark reports go to stdout; everything logged through `tracing` goes
//! to stderr so the two never interleave in a captured report.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Standard tracing filter (e.g., `info`, `keyspace_bench=debug`)
//! - `LOG_FORMAT`: Output format - `pretty` (default), `compact`, or `json`
//! - `LOG_TIMESTAMPS`: Timestamp format - `local` (default), `utc`, or `none`
//! - `LOG_LEVEL`: Fallback level when `RUST_LOG` is unset
//! - `LOG_LOCATION`: `true`/`false` for file:line info
//!
//! # Usage
//!
//! ```rust,ignore
//! use keyspace_common::logging::{init_logging, LogConfig};
//!
//! init_logging(LogConfig::from_env().with_app_name("keyspace-bench"))?;
//! ```

mod config;

pub use config::{init_logging, LogConfig, LogFormat, TimestampFormat};
