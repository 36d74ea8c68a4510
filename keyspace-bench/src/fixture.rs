//! Store lifecycle around each scenario
//!
//! A run starts from an empty store and every scenario leaves one behind.

use tracing::{info, warn};

use keyspace_common::KeyValueStore;

use crate::error::{BenchError, BenchResult};

/// Make sure the store is empty before the first scenario.
///
/// With `flush_before_run` a non-empty store is flushed, otherwise the run
/// is refused so existing data is never destroyed by accident.
pub fn prepare_store(store: &mut dyn KeyValueStore, flush_before_run: bool) -> BenchResult<()> {
    let keys = store.dbsize()?;
    if keys == 0 {
        return Ok(());
    }
    if !flush_before_run {
        return Err(BenchError::StoreNotEmpty { keys });
    }

    info!(keys, backend = %store.backend(), "Flushing non-empty store before run");
    store.flush_all()?;
    Ok(())
}

/// Run `scenario`, then flush the whole store whatever the outcome.
///
/// When the scenario failed, a flush error is only logged and the
/// scenario's own error is returned.
pub fn run_isolated<T>(
    store: &mut dyn KeyValueStore,
    scenario: impl FnOnce(&mut dyn KeyValueStore) -> BenchResult<T>,
) -> BenchResult<T> {
    let result = scenario(&mut *store);
    let flushed = store.flush_all();

    match (result, flushed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(flush_err)) => {
            warn!(error = %flush_err, "Flush after failed scenario also failed");
            Err(e)
        }
    }
}
