//! Fixed-capacity FIFO log.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::VecDeque;

/// Append-only log holding at most `CAP` entries, oldest first.
///
/// Pushing past capacity evicts from the front. Deserializing an
/// over-long list keeps only the newest `CAP` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T, const CAP: usize> {
    entries: VecDeque<T>,
}

impl<T, const CAP: usize> BoundedLog<T, CAP> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(CAP),
        }
    }

    /// Append `entry`, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_back(entry);
        if self.entries.len() > CAP {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently appended entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    fn trim(&mut self) {
        while self.entries.len() > CAP {
            self.entries.pop_front();
        }
    }
}

impl<T, const CAP: usize> Default for BoundedLog<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize, const CAP: usize> Serialize for BoundedLog<T, CAP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const CAP: usize> Deserialize<'de> for BoundedLog<T, CAP> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = VecDeque::<T>::deserialize(deserializer)?;
        let mut log = Self { entries };
        log.trim();
        Ok(log)
    }
}
