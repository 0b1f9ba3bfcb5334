//! Cache boundary.
//!
//! The cursor consults the cache before trusting any remote row, so the
//! contract must keep a clean miss distinguishable from a backend failure:
//! `Ok(None)` is a miss, `Err` is never one.

use crate::{db::AttrMap, error::ErrorClass};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use thiserror::Error as ThisError;

///
/// RecordCache
///
/// Process-wide snapshot store keyed by `(collection, item name)`.
/// Key-level atomicity is the whole guarantee: entries are replaced
/// wholesale and there are no cross-key transactions.
///

pub trait RecordCache: Send + Sync {
    /// Look up a snapshot. `Ok(None)` is a clean miss.
    fn get(&self, collection: &str, name: &str) -> Result<Option<AttrMap>, CacheError>;

    /// Store a full snapshot, replacing any previous entry.
    fn set(&self, collection: &str, name: &str, attrs: &AttrMap) -> Result<(), CacheError>;

    /// Drop the entry, if present.
    fn evict(&self, collection: &str, name: &str) -> Result<(), CacheError>;
}

///
/// CacheError
/// Backend and codec failures; a clean miss is never an error.
///

#[derive(Debug, ThisError)]
pub enum CacheError {
    #[error("cache backend failure: {0}")]
    Backend(String),

    #[error("cached snapshot failed to decode for {collection}/{name}: {reason}")]
    Codec {
        collection: String,
        name: String,
        reason: String,
    },
}

impl CacheError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Backend(_) => ErrorClass::Unavailable,
            Self::Codec { .. } => ErrorClass::Internal,
        }
    }
}

///
/// Snapshot codec
///
/// Entries are stored as CBOR so any backend that can hold bytes can hold
/// a snapshot; the in-memory backend uses the same encoding as a networked
/// one would.
///

mod codec {
    use crate::db::AttrMap;

    pub(super) fn encode(attrs: &AttrMap) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(attrs)
    }

    pub(super) fn decode(bytes: &[u8]) -> Result<AttrMap, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

///
/// MemoryCache
///
/// Shared in-process cache backend. A poisoned lock is recovered rather
/// than propagated: entries are replaced wholesale, so the data a panicking
/// writer left behind is still a valid snapshot.
///

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, collection: &str, name: &str, bytes: Vec<u8>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((collection.to_string(), name.to_string()), bytes);
    }
}

impl RecordCache for MemoryCache {
    fn get(&self, collection: &str, name: &str) -> Result<Option<AttrMap>, CacheError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        let Some(bytes) = entries.get(&(collection.to_string(), name.to_string())) else {
            return Ok(None);
        };

        codec::decode(bytes).map(Some).map_err(|err| CacheError::Codec {
            collection: collection.to_string(),
            name: name.to_string(),
            reason: err.to_string(),
        })
    }

    fn set(&self, collection: &str, name: &str, attrs: &AttrMap) -> Result<(), CacheError> {
        let bytes = codec::encode(attrs).map_err(|err| CacheError::Backend(err.to_string()))?;

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((collection.to_string(), name.to_string()), bytes);

        Ok(())
    }

    fn evict(&self, collection: &str, name: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(collection.to_string(), name.to_string()));

        Ok(())
    }
}
