//! Keyspace Module
//!
//! Synchronous storage engine behind [`MemoryStore`](super::MemoryStore):
//! a HashMap of byte strings and lists with lazy TTL expiration, following the
//! command semantics of a Redis database.

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::store::{StoreEntry, StoredData};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

// == Keyspace ==
/// A single logical database.
#[derive(Debug, Default)]
pub struct Keyspace {
    /// Key-value storage
    entries: HashMap<String, StoreEntry>,
}

impl Keyspace {
    // == Constructor ==
    /// Creates an empty keyspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a live entry, dropping it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.get(key).is_some_and(StoreEntry::is_expired) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    // == Get ==
    /// Retrieves a byte string by key.
    ///
    /// Returns `None` if the key is absent or expired.
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.live(key) {
            Some(StoreEntry {
                data: StoredData::Bytes(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(CacheError::Backend(WRONGTYPE.to_string())),
            None => Ok(None),
        }
    }

    // == Set ==
    /// Stores a byte string with optional TTL in seconds.
    ///
    /// Any existing value is replaced regardless of its type, and its TTL is reset.
    pub fn set(&mut self, key: &str, value: &[u8], ttl: Option<u64>) -> Result<()> {
        if ttl == Some(0) {
            return Err(CacheError::InvalidRequest(
                "invalid expire time in 'setex' command".to_string(),
            ));
        }

        let data = StoredData::Bytes(value.to_vec());
        let entry = match ttl {
            Some(ttl) => StoreEntry::expiring(data, ttl)?,
            None => StoreEntry::persistent(data),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    // == Incr ==
    /// Increments the integer stored at `key` by one and returns the new value.
    ///
    /// A missing key counts as zero. The key's TTL, if any, is preserved.
    pub fn incr(&mut self, key: &str) -> Result<i64> {
        let Some(entry) = self.live(key) else {
            self.entries.insert(
                key.to_string(),
                StoreEntry::persistent(StoredData::Bytes(b"1".to_vec())),
            );
            return Ok(1);
        };

        let StoredData::Bytes(raw) = &mut entry.data else {
            return Err(CacheError::Backend(WRONGTYPE.to_string()));
        };

        let next = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                CacheError::Backend("value is not an integer or out of range".to_string())
            })?;

        *raw = next.to_string().into_bytes();
        Ok(next)
    }

    // == RPush ==
    /// Appends `value` to the list at `key`, creating it if needed.
    ///
    /// Returns the length of the list after the push.
    pub fn rpush(&mut self, key: &str, value: &[u8]) -> Result<usize> {
        if let Some(entry) = self.live(key) {
            return match &mut entry.data {
                StoredData::List(items) => {
                    items.push(value.to_vec());
                    Ok(items.len())
                }
                StoredData::Bytes(_) => Err(CacheError::Backend(WRONGTYPE.to_string())),
            };
        }

        self.entries.insert(
            key.to_string(),
            StoreEntry::persistent(StoredData::List(vec![value.to_vec()])),
        );
        Ok(1)
    }

    // == LRange ==
    /// Returns the inclusive range `start..=stop` of the list at `key`.
    ///
    /// Negative indices count from the end (`-1` is the last element). Out of
    /// range indices are clamped; a missing key yields an empty list.
    pub fn lrange(&mut self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let items = match self.live(key) {
            Some(StoreEntry {
                data: StoredData::List(items),
                ..
            }) => items,
            Some(_) => return Err(CacheError::Backend(WRONGTYPE.to_string())),
            None => return Ok(Vec::new()),
        };

        let len = items.len() as isize;
        let start = if start < 0 { (start + len).max(0) } else { start };
        let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(items[start as usize..=stop as usize].to_vec())
    }

    // == Flush ==
    /// Removes every key.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the number of entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the keyspace holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
