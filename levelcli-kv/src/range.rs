use std::cmp::Ordering;

use super::*;

/// A `[start, limit)` key range. Missing bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRange {
    pub start: Option<Vec<u8>>,
    pub limit: Option<Vec<u8>>,
}

impl KeyRange {
    pub fn new(start: Option<Vec<u8>>, limit: Option<Vec<u8>>) -> Self {
        Self { start, limit }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.limit.is_none()
    }

    pub fn contains(&self, order: KeyOrder, key: &[u8]) -> bool {
        self.start
            .as_deref()
            .is_none_or(|start| order.compare(start, key) != Ordering::Greater)
            && self.is_below_limit(order, key)
    }

    /// Whether `key` sorts before the limit, ignoring the start.
    pub fn is_below_limit(&self, order: KeyOrder, key: &[u8]) -> bool {
        self.limit
            .as_deref()
            .is_none_or(|limit| order.compare(key, limit) == Ordering::Less)
    }

    /// An inverted range selects nothing; collapse it so that it reads as empty.
    pub fn clamp(mut self, order: KeyOrder) -> Self {
        if let (Some(start), Some(limit)) = (&self.start, &self.limit) {
            if order.compare(start, limit) == Ordering::Greater {
                self.limit = self.start.clone();
            }
        }
        self
    }
}
