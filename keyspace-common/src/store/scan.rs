use crate::error::StoreResult;

/// Drive a cursor-based scan to completion.
///
/// `step` takes the current cursor and returns the next cursor plus the keys
/// found in that step. The walk starts and ends at cursor 0. A key may show up
/// in more than one step, so the result is sorted and deduplicated.
pub(crate) fn scan_all<F>(mut step: F) -> StoreResult<Vec<String>>
where
    F: FnMut(u64) -> StoreResult<(u64, Vec<String>)>,
{
    let mut cursor = 0;
    let mut keys = Vec::new();
    loop {
        let (next, batch) = step(cursor)?;
        keys.extend(batch);
        if next == 0 {
            break;
        }
        cursor = next;
    }

    keys.sort_unstable();
    keys.dedup();
    Ok(keys)
}
