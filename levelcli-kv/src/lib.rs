#[cfg(feature = "leveldb")]
mod kv_leveldb;
mod memory;
mod order;
mod range;

#[cfg(feature = "leveldb")]
pub use kv_leveldb::*;
pub use memory::*;
pub use order::*;
pub use range::*;

use anyhow::Result;

/// A standard interface for accessing entries in the KV.
pub trait OpaqueItem {
    fn key(&self) -> &[u8];
    fn value(&self) -> &[u8];
}

/// An owned key/value pair read out of a KV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl OpaqueItem for Entry {
    fn key(&self) -> &[u8] {
        &self.key
    }

    fn value(&self) -> &[u8] {
        &self.value
    }
}

/// A single ordered key-value keyspace. Keys are kept in the order given by [`KV::order`].
pub trait KV {
    /// The key order the store was opened with.
    fn order(&self) -> KeyOrder;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Insert all entries atomically.
    fn write_batch(&self, entries: &[Entry]) -> Result<()>;

    /// Visit the entries of `range` in ascending key order until `predicate` returns `false`.
    fn scan<S>(&self, range: &KeyRange, predicate: S) -> Result<()>
    where
        S: FnMut(&[u8], &[u8]) -> Result<bool>;

    /// Persist buffered writes.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Collect the entries of `range` in ascending key order.
    fn range(&self, range: &KeyRange) -> Result<Vec<Entry>> {
        let mut out = Vec::default();
        self.scan(range, |key, value| {
            out.push(Entry {
                key: key.to_vec(),
                value: value.to_vec(),
            });
            Ok(true)
        })?;
        Ok(out)
    }

    /// Number of entries in `range`.
    fn count(&self, range: &KeyRange) -> Result<u64> {
        let mut count = 0;
        self.scan(range, |_, _| {
            count += 1;
            Ok(true)
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod test;
