use crate::node::{NodeMetadata, NodePath};

use super::{
    data_key, meta_key, Bytes, MaybeBytes, StorageError, StoreKey, StoreKeys, StoreKeysPrefixes,
    StorePrefix,
};

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;

    /// Return the size in bytes of the value at `key`.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;
}

/// Listable storage traits.
pub trait ListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.list_prefix(&StorePrefix::root())
    }

    /// Retrieve all [`StoreKeys`] with a given [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] and [`StorePrefix`] which are direct children of [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;

    /// Return the size in bytes of all keys under `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError>;

    /// Return the total size in bytes of the storage.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn size(&self) -> Result<u64, StorageError> {
        self.size_prefix(&StorePrefix::root())
    }
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// Succeeds if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase a list of [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        keys.iter().try_for_each(|key| self.erase(key))
    }

    /// Erase all [`StoreKey`] under [`StorePrefix`].
    ///
    /// Succeeds if there are no keys under the prefix.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the erase fails.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T> ReadableWritableStorageTraits for T where T: ReadableStorageTraits + WritableStorageTraits {}

/// A supertrait of [`ReadableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableListableStorageTraits: ReadableStorageTraits + ListableStorageTraits {}

impl<T> ReadableListableStorageTraits for T where T: ReadableStorageTraits + ListableStorageTraits {}

/// A supertrait of [`ReadableWritableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableWritableListableStorageTraits:
    ReadableWritableStorageTraits + ListableStorageTraits
{
}

impl<T> ReadableWritableListableStorageTraits for T where
    T: ReadableWritableStorageTraits + ListableStorageTraits
{
}

/// Retrieve the metadata of the node at `path`.
///
/// Returns [`None`] if the node has no metadata document.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is not valid.
pub fn retrieve_metadata<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<Option<NodeMetadata>, StorageError> {
    let key = meta_key(path);
    storage
        .get(&key)?
        .map(|bytes| {
            serde_json::from_slice::<NodeMetadata>(&bytes)
                .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
        })
        .transpose()
}

/// Store the metadata of the node at `path`, replacing any existing metadata.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn store_metadata<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata: &NodeMetadata,
) -> Result<(), StorageError> {
    let key = meta_key(path);
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    storage.set(&key, json.into())
}

/// Store an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn store_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    dataset_path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_encoded: Bytes,
) -> Result<(), StorageError> {
    storage.set(&data_key(dataset_path, chunk_grid_indices), chunk_encoded)
}

/// Retrieve an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_chunk<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    dataset_path: &NodePath,
    chunk_grid_indices: &[u64],
) -> Result<MaybeBytes, StorageError> {
    storage.get(&data_key(dataset_path, chunk_grid_indices))
}

/// Erase a chunk.
///
/// Succeeds if the chunk does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    dataset_path: &NodePath,
    chunk_grid_indices: &[u64],
) -> Result<(), StorageError> {
    storage.erase(&data_key(dataset_path, chunk_grid_indices))
}

/// Erase a node (group or dataset) and all of its children.
///
/// Succeeds if the node does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_node<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<(), StorageError> {
    storage.erase_prefix(&path.into())
}

/// Check if a node exists.
///
/// A node exists if it has a metadata document.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn node_exists<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<bool, StorageError> {
    Ok(storage.size_key(&meta_key(path))?.is_some())
}

/// Discover the paths of the children of a node.
///
/// Only prefixes holding a metadata document are children, so the chunk prefix of a dataset is never returned.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_children<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<Vec<NodePath>, StorageError> {
    let mut children = Vec::new();
    for prefix in storage.list_dir(&path.into())?.prefixes() {
        let child = NodePath::try_from(prefix)?;
        if node_exists(storage, &child)? {
            children.push(child);
        }
    }
    Ok(children)
}
