//! A storage adapter which logs storage method calls.

use std::{io::Write, sync::Arc};

use itertools::Itertools;
use parking_lot::Mutex;

use crate::storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

/// The usage log storage adapter. Logs storage method calls.
///
/// It is intended to aid in debugging and optimising performance by revealing storage access patterns.
/// Every call is written as one line to `handle`, starting with the output of `prefix_func`.
///
/// ### Example (log to stdout)
/// ```rust
/// # use std::sync::Arc;
/// # use parking_lot::Mutex;
/// # use zarrs_dataset::storage::{store::MemoryStore, storage_adapter::UsageLogStorageAdapter};
/// let store = Arc::new(MemoryStore::new());
/// let log_writer = Arc::new(Mutex::new(std::io::stdout()));
/// let store = Arc::new(UsageLogStorageAdapter::new(store, log_writer, || {
///     chrono::Utc::now().format("[%T%.3f] ").to_string()
/// }));
/// ```
///
/// Appending a record to a dataset through the above adapter prints outputs like:
/// ```text
/// [10:02:11.201] get(records/zarr.json) -> len=Ok(Some(512))
/// [10:02:11.201] set(records/zarr.json, len=512) -> Ok(())
/// [10:02:11.202] get(records/zarr.json) -> len=Ok(Some(512))
/// [10:02:11.202] get(records/c/3/0) -> len=Ok(None)
/// [10:02:11.202] set(records/c/3/0, len=41) -> Ok(())
/// ```
pub struct UsageLogStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    handle: Arc<Mutex<dyn Write + Send + Sync>>,
    prefix_func: fn() -> String,
}

impl<TStorage: ?Sized> core::fmt::Debug for UsageLogStorageAdapter<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "usage log")
    }
}

impl<TStorage: ?Sized> UsageLogStorageAdapter<TStorage> {
    /// Create a new usage log storage adapter.
    pub fn new(
        storage: Arc<TStorage>,
        handle: Arc<Mutex<dyn Write + Send + Sync>>,
        prefix_func: fn() -> String,
    ) -> Self {
        Self {
            storage,
            handle,
            prefix_func,
        }
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let result = self.storage.get(key);
        writeln!(
            self.handle.lock(),
            "{}get({key}) -> len={:?}",
            (self.prefix_func)(),
            result.as_ref().map(|v| v.as_ref().map(Bytes::len))
        )?;
        result
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let result = self.storage.size_key(key);
        writeln!(
            self.handle.lock(),
            "{}size_key({key}) -> {result:?}",
            (self.prefix_func)()
        )?;
        result
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> ListableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn list(&self) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list();
        writeln!(
            self.handle.lock(),
            "{}list() -> [{}]",
            (self.prefix_func)(),
            result.as_ref().map_or(String::new(), |keys| keys
                .iter()
                .format(", ")
                .to_string())
        )?;
        result
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list_prefix(prefix);
        writeln!(
            self.handle.lock(),
            "{}list_prefix({prefix}) -> [{}]",
            (self.prefix_func)(),
            result.as_ref().map_or(String::new(), |keys| keys
                .iter()
                .format(", ")
                .to_string())
        )?;
        result
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let result = self.storage.list_dir(prefix);
        writeln!(
            self.handle.lock(),
            "{}list_dir({prefix}) -> (keys:[{}], prefixes:[{}])",
            (self.prefix_func)(),
            result.as_ref().map_or(String::new(), |skp| skp
                .keys()
                .iter()
                .format(", ")
                .to_string()),
            result.as_ref().map_or(String::new(), |skp| skp
                .prefixes()
                .iter()
                .format(", ")
                .to_string()),
        )?;
        result
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        let result = self.storage.size_prefix(prefix);
        writeln!(
            self.handle.lock(),
            "{}size_prefix({prefix}) -> {result:?}",
            (self.prefix_func)()
        )?;
        result
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let len = value.len();
        let result = self.storage.set(key, value);
        writeln!(
            self.handle.lock(),
            "{}set({key}, len={len}) -> {result:?}",
            (self.prefix_func)()
        )?;
        result
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let result = self.storage.erase(key);
        writeln!(
            self.handle.lock(),
            "{}erase({key}) -> {result:?}",
            (self.prefix_func)()
        )?;
        result
    }

    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let result = self.storage.erase_values(keys);
        writeln!(
            self.handle.lock(),
            "{}erase_values([{}]) -> {result:?}",
            (self.prefix_func)(),
            keys.iter().format(", ")
        )?;
        result
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let result = self.storage.erase_prefix(prefix);
        writeln!(
            self.handle.lock(),
            "{}erase_prefix({prefix}) -> {result:?}",
            (self.prefix_func)()
        )?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;
    use std::error::Error;

    #[test]
    fn usage_log() -> Result<(), Box<dyn Error>> {
        let log = Arc::new(Mutex::new(Vec::<u8>::new()));
        let store = UsageLogStorageAdapter::new(
            Arc::new(MemoryStore::new()),
            log.clone(),
            || "log: ".to_string(),
        );
        store.set(&"a/b".try_into()?, vec![0, 1, 2].into())?;
        store.get(&"a/b".try_into()?)?;
        store.get(&"a/c".try_into()?)?;
        store.erase_prefix(&"a/".try_into()?)?;
        store.list()?;

        let log = String::from_utf8(log.lock().clone())?;
        assert_eq!(
            log,
            "log: set(a/b, len=3) -> Ok(())\n\
             log: get(a/b) -> len=Ok(Some(3))\n\
             log: get(a/c) -> len=Ok(None)\n\
             log: erase_prefix(a/) -> Ok(())\n\
             log: list() -> []\n"
        );
        Ok(())
    }
}
