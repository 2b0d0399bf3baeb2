use std::cmp::Ordering;

use anyhow::Result;
use levelcli_idb::IdbCmp1;
use levelcli_idb::prefix_range;
use levelcli_idb::succ_bytes;

use super::*;

/// The total order a store keeps its keys in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// LevelDB's default byte-wise order.
    #[default]
    Bytewise,
    /// Chromium's IndexedDB order, `idb_cmp1`.
    IndexedDb,
}

impl KeyOrder {
    /// Comparator name recorded in the store's manifest.
    pub fn name(&self) -> &'static str {
        match self {
            KeyOrder::Bytewise => "leveldb.BytewiseComparator",
            KeyOrder::IndexedDb => IdbCmp1::NAME,
        }
    }

    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            KeyOrder::Bytewise => a.cmp(b),
            KeyOrder::IndexedDb => IdbCmp1.compare(a, b),
        }
    }

    /// The range of keys starting with `prefix` under this order. An empty prefix selects
    /// everything.
    pub fn prefix_range(&self, prefix: &[u8]) -> Result<KeyRange> {
        if prefix.is_empty() {
            return Ok(KeyRange::all());
        }
        let range = match self {
            KeyOrder::Bytewise => KeyRange::new(Some(prefix.to_vec()), succ_bytes(prefix)),
            KeyOrder::IndexedDb => match prefix_range(prefix)? {
                Some(range) => {
                    log::debug!("idb prefix range {}", range.to_hex());
                    KeyRange::new(Some(range.start), range.limit)
                }
                None => KeyRange::all(),
            },
        };
        Ok(range)
    }
}
