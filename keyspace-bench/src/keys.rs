//! Key naming for each strategy.
//!
//! | Function | Format |
//! |----------|--------|
//! | [`flat_key`] | `group_{g}_member_{m}` |
//! | [`flat_group_pattern`] | `group_{g}_*` |
//! | [`hash_key`] | `group_{g}` |
//! | [`hash_field`] | `member_{m}` |
//! | [`indexed_key`] | `member_{g}_{m}` |
//! | [`index_set_key`] | `group_{g}_members` |
//!
//! The `_` after the group id in [`flat_group_pattern`] keeps `group_1_*`
//! from matching keys of group 10, 100 and so on.

/// Flat strategy: one string key per member
pub fn flat_key(group: u32, member: u32) -> String {
    format!("group_{}_member_{}", group, member)
}

/// Flat strategy: glob selecting every key of one group
pub fn flat_group_pattern(group: u32) -> String {
    format!("group_{}_*", group)
}

/// Hashed strategy: one hash per group
pub fn hash_key(group: u32) -> String {
    format!("group_{}", group)
}

/// Hashed strategy: field of one member inside the group hash
pub fn hash_field(member: u32) -> String {
    format!("member_{}", member)
}

/// Indexed strategy: one string key per member
pub fn indexed_key(group: u32, member: u32) -> String {
    format!("member_{}_{}", group, member)
}

/// Indexed strategy: set holding the member key names of one group
pub fn index_set_key(group: u32) -> String {
    format!("group_{}_members", group)
}
