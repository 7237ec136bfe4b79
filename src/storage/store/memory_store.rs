//! An in-memory store.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

/// An in-memory store.
///
/// Values are held in a sorted map, so listing is always ordered.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_map: Mutex<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    /// Create a new, empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        Ok(self.data_map.lock().get(key).cloned())
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        Ok(self
            .data_map
            .lock()
            .get(key)
            .map(|value| value.len() as u64))
    }
}

impl WritableStorageTraits for MemoryStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.data_map.lock().insert(key.clone(), value);
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.data_map.lock().remove(key);
        Ok(())
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.data_map.lock().retain(|key, _| !key.has_prefix(prefix));
        Ok(())
    }
}

impl ListableStorageTraits for MemoryStore {
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self
            .data_map
            .lock()
            .keys()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect())
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let mut keys: StoreKeys = vec![];
        let mut prefixes: BTreeSet<StorePrefix> = BTreeSet::default();
        let data_map = self.data_map.lock();
        for key in data_map.keys().filter(|key| key.has_prefix(prefix)) {
            let key_strip = &key.as_str()[prefix.as_str().len()..];
            match key_strip.split_once('/') {
                Some((child, _)) => {
                    prefixes.insert(StorePrefix::new(format!("{prefix}{child}/"))?);
                }
                None => keys.push(key.clone()),
            }
        }
        Ok(StoreKeysPrefixes::new(keys, prefixes.into_iter().collect()))
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        Ok(self
            .data_map
            .lock()
            .iter()
            .filter(|(key, _)| key.has_prefix(prefix))
            .map(|(_, value)| value.len() as u64)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn memory() -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::new();
        super::super::test_util::store_write(&store)?;
        super::super::test_util::store_read(&store)?;
        super::super::test_util::store_list(&store)?;
        Ok(())
    }

    #[test]
    fn memory_erase_prefix_is_exact() -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::new();
        store.set(&"a/x".try_into()?, vec![0].into())?;
        store.set(&"ab/x".try_into()?, vec![0].into())?;
        store.erase_prefix(&"a/".try_into()?)?;
        assert_eq!(store.list()?, &[StoreKey::new("ab/x")?]);
        Ok(())
    }
}
