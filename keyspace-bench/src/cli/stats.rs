//! Stats command - print a Redis server's memory statistics

use std::fmt::Write;

use anyhow::{bail, Result};
use clap::Args;

use keyspace_common::{KeyValueStore, StoreBackend};

use crate::config::DEFAULT_REDIS_URL;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Store backend. Only redis has state outside this process; `run
    /// --backend memory` reports in-memory stats per scenario instead.
    #[arg(long, short, default_value = "redis")]
    pub backend: StoreBackend,

    /// Redis URL, overrides REDIS_URL
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the stats command
pub fn execute(args: StatsArgs) -> Result<()> {
    if args.backend == StoreBackend::Memory {
        bail!("a memory store starts empty in every process; use `run --backend memory` to see its stats");
    }

    let env_url = std::env::var("REDIS_URL").ok();
    let url = super::resolve_redis_url(args.redis_url.as_deref(), env_url.as_deref(), DEFAULT_REDIS_URL);

    let mut store = super::connect(args.backend, &url)?;
    print!("{}", render(store.as_mut(), args.json)?);
    Ok(())
}

/// Key count and memory statistics of `store`, as text or JSON
pub fn render(store: &mut dyn KeyValueStore, json: bool) -> Result<String> {
    let keys = store.dbsize()?;
    let stats = store.memory_stats()?;

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&stats)?));
    }

    let mut out = String::new();
    writeln!(out, "Backend: {}", store.backend()).unwrap();
    writeln!(out, "Keys:    {}", keys).unwrap();
    for (name, value) in stats.entries() {
        writeln!(out, "  {}: {}", name, value).unwrap();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyspace_common::InMemoryStore;

    #[test]
    fn test_stats_rejects_memory_backend() {
        let args = StatsArgs {
            backend: StoreBackend::Memory,
            redis_url: None,
            json: true,
        };
        let err = execute(args).unwrap_err();
        assert!(err.to_string().contains("run --backend memory"));
    }

    #[test]
    fn test_render_reports_live_keys() {
        let mut store = InMemoryStore::new();
        store.set("group_1_member_1", "payload").unwrap();
        store.hset("group_2", "member_1", "payload").unwrap();

        let text = render(&mut store, false).unwrap();
        assert!(text.starts_with("Backend: memory\nKeys:    2\n"), "{}", text);
        assert!(text.contains("keys.count: 2"), "{}", text);

        let json = render(&mut store, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(7));
    }
}
