//! Key ordering for LevelDB stores written by Chromium's IndexedDB backend.
//!
//! IndexedDB does not store its keys in bytewise order. Every key starts with a
//! packed `(database_id, object_store_id, index_id)` prefix, followed by a body
//! whose grammar depends on what kind of record the prefix describes. The store
//! is opened with a comparator named `idb_cmp1` that understands this layout.
//!
//! This crate provides two things over that layout:
//!
//! - [`IdbCmp1`], the comparator itself. It tolerates truncated keys so that
//!   partial keys can be used as range bounds.
//! - [`prefix_range`], which turns an arbitrary byte prefix (possibly ending in
//!   the middle of a field) into a `[start, limit)` range that contains every key
//!   extending the prefix under `idb_cmp1`.
//!
//! Both walk the same per-kind field grammar so they stay in agreement.

mod codec;
mod comparator;
mod error;
mod grammar;
mod key_prefix;
mod prefix;
mod value;

pub use codec::*;
pub use comparator::*;
pub use error::*;
pub use key_prefix::*;
pub use prefix::*;
pub use value::*;

#[cfg(test)]
mod test;
