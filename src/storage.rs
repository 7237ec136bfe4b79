//! Storage for dataset hierarchies ([stores](store) and [storage adapters](storage_adapter)).
//!
//! A [store] is a key/value system holding the metadata documents and encoded chunks of a hierarchy.
//! For example: process memory or a directory on a filesystem.
//!
//! A [storage adapter](storage_adapter) wraps a store and has the same interface as a store.
//!
//! This module defines the abstract store interfaces and the key layout of a hierarchy:
//! - the metadata of the node at `/a/b` is stored at the key `a/b/zarr.json` ([`meta_key`]),
//! - the chunk with grid indices `[i, j]` of the dataset at `/a/b` is stored at the key `a/b/c/i/j` ([`data_key`]).

pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

use std::sync::Arc;

use itertools::Itertools;
use thiserror::Error;

use crate::node::{NodeNameError, NodePath, NodePathError};

pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

pub use self::storage_sync::{
    discover_children, erase_chunk, erase_node, node_exists, retrieve_chunk, retrieve_metadata,
    store_chunk, store_metadata, ListableStorageTraits, ReadableListableStorageTraits,
    ReadableStorageTraits, ReadableWritableListableStorageTraits, ReadableWritableStorageTraits,
    WritableStorageTraits,
};

/// Stored bytes.
pub type Bytes = bytes::Bytes;

/// Optional stored bytes. [`None`] represents a missing key.
pub type MaybeBytes = Option<Bytes>;

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// [`Arc`] wrapped writable storage.
pub type WritableStorage = Arc<dyn WritableStorageTraits>;

/// [`Arc`] wrapped readable and writable storage.
pub type ReadableWritableStorage = Arc<dyn ReadableWritableStorageTraits>;

/// [`Arc`] wrapped readable, writable, and listable storage.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

/// [`StoreKeys`] and [`StorePrefixes`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Create a new [`StoreKeysPrefixes`].
    #[must_use]
    pub fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// Returns the keys.
    #[must_use]
    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Returns the prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error("invalid store prefix {0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid node path.
    #[error("invalid node path {0}")]
    NodePathError(#[from] NodePathError),
    /// An invalid node name.
    #[error("invalid node name {0}")]
    NodeNameError(#[from] NodeNameError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// Return the metadata key (`zarr.json`) given a node path.
#[must_use]
pub fn meta_key(path: &NodePath) -> StoreKey {
    let path = path.as_str();
    if path.eq("/") {
        unsafe { StoreKey::new_unchecked("zarr.json") }
    } else {
        let path = path.strip_prefix('/').unwrap_or(path);
        unsafe { StoreKey::new_unchecked(format!("{path}/zarr.json")) }
    }
}

/// Return the data key of a chunk given a node path and chunk grid indices.
///
/// Chunk keys use the default chunk key encoding with a `/` separator.
/// The single chunk of a dataset with rank zero is stored at `c`.
#[must_use]
pub fn data_key(path: &NodePath, chunk_grid_indices: &[u64]) -> StoreKey {
    let path = path.as_str();
    let path = path.strip_prefix('/').unwrap_or(path);
    let chunk = std::iter::once("c".to_string())
        .chain(chunk_grid_indices.iter().map(ToString::to_string))
        .join("/");
    if path.is_empty() {
        unsafe { StoreKey::new_unchecked(chunk) }
    } else {
        unsafe { StoreKey::new_unchecked(format!("{path}/{chunk}")) }
    }
}
