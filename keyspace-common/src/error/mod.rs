//! Error handling for store access.
//!
//! Every backend reports failures through [`StoreError`]. There is no retry
//! classification: a failed command aborts the benchmark run that issued it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use keyspace_common::error::{StoreError, StoreResult};
//!
//! fn read(store: &mut dyn KeyValueStore) -> StoreResult<Option<String>> {
//!     store.get("group_1_member_1")
//! }
//! ```

mod common;

pub use common::*;
