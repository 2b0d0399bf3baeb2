use std::cell::RefCell;

use anyhow::Result;

use super::*;

/// A KV held in memory, kept sorted under its [`KeyOrder`].
#[derive(Debug, Default)]
pub struct MemoryKV {
    order: KeyOrder,
    entries: RefCell<Vec<Entry>>,
}

impl MemoryKV {
    pub fn new(order: KeyOrder) -> Self {
        Self {
            order,
            entries: RefCell::default(),
        }
    }

    fn position(&self, entries: &[Entry], key: &[u8]) -> std::result::Result<usize, usize> {
        entries.binary_search_by(|entry| self.order.compare(&entry.key, key))
    }

    fn insert(&self, entries: &mut Vec<Entry>, key: &[u8], value: &[u8]) {
        match self.position(entries, key) {
            Ok(i) => entries[i].value = value.to_vec(),
            Err(i) => entries.insert(
                i,
                Entry {
                    key: key.to_vec(),
                    value: value.to_vec(),
                },
            ),
        }
    }
}

impl KV for MemoryKV {
    fn order(&self) -> KeyOrder {
        self.order
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.borrow();
        Ok(self
            .position(&entries, key)
            .ok()
            .map(|i| entries[i].value.clone()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.insert(&mut self.entries.borrow_mut(), key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        if let Ok(i) = self.position(&entries, key) {
            entries.remove(i);
        }
        Ok(())
    }

    fn write_batch(&self, batch: &[Entry]) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        for entry in batch {
            self.insert(&mut entries, &entry.key, &entry.value);
        }
        Ok(())
    }

    fn scan<S>(&self, range: &KeyRange, mut predicate: S) -> Result<()>
    where
        S: FnMut(&[u8], &[u8]) -> Result<bool>,
    {
        let entries = self.entries.borrow();
        let first = match &range.start {
            Some(start) => self.position(&entries, start).unwrap_or_else(|i| i),
            None => 0,
        };
        for entry in &entries[first..] {
            if !range.is_below_limit(self.order, &entry.key) {
                break;
            }
            if !predicate(&entry.key, &entry.value)? {
                break;
            }
        }
        Ok(())
    }
}
