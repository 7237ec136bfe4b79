//! Stores.
//!
//! - [`MemoryStore`]: an in-memory store, useful for tests and transient hierarchies.
//! - [`FilesystemStore`]: a store holding each key as a file below a base directory.

mod filesystem_store;
mod memory_store;

pub use filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
pub use memory_store::MemoryStore;

#[cfg(test)]
mod test_util {
    use std::error::Error;

    use crate::storage::{
        ListableStorageTraits, ReadableStorageTraits, StorePrefix, WritableStorageTraits,
    };

    /// Create a store with the following data
    /// - a/
    ///   - b [0, 1, 2, 3]
    ///   - c [0]
    ///   - d/
    ///     - e
    ///   - f/
    ///     - g
    ///     - h
    /// - i/
    ///   - j/
    ///     - k [0, 1]
    pub fn store_write<T: WritableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        store.erase_prefix(&StorePrefix::root())?;

        store.set(&"a/b".try_into()?, vec![255, 255].into())?;
        store.set(&"a/b".try_into()?, vec![0, 1, 2, 3].into())?;
        store.set(&"a/c".try_into()?, vec![0].into())?;
        store.set(&"a/d/e".try_into()?, vec![].into())?;
        store.set(&"a/f/g".try_into()?, vec![].into())?;
        store.set(&"a/f/h".try_into()?, vec![].into())?;
        store.set(&"i/j/k".try_into()?, vec![0, 1].into())?;

        store.set(&"erase".try_into()?, vec![].into())?;
        store.erase(&"erase".try_into()?)?;
        store.erase(&"erase".try_into()?)?; // succeeds

        store.set(&"erase_values_0".try_into()?, vec![].into())?;
        store.set(&"erase_values_1".try_into()?, vec![].into())?;
        store.erase_values(&["erase_values_0".try_into()?, "erase_values_1".try_into()?])?;

        store.set(&"erase_prefix/0".try_into()?, vec![].into())?;
        store.set(&"erase_prefix/1".try_into()?, vec![].into())?;
        store.erase_prefix(&"erase_prefix/".try_into()?)?;
        store.erase_prefix(&"erase_prefix/".try_into()?)?; // succeeds

        Ok(())
    }

    pub fn store_read<T: ReadableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        assert!(store.get(&"notfound".try_into()?)?.is_none());
        assert!(store.size_key(&"notfound".try_into()?)?.is_none());
        assert_eq!(
            store.get(&"a/b".try_into()?)?,
            Some(vec![0, 1, 2, 3].into())
        );
        assert_eq!(store.size_key(&"a/b".try_into()?)?, Some(4));
        assert_eq!(store.size_key(&"a/d/e".try_into()?)?, Some(0));
        assert!(store.get(&"erase".try_into()?)?.is_none());
        assert!(store.get(&"erase_prefix/0".try_into()?)?.is_none());
        Ok(())
    }

    pub fn store_list<T: ListableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        assert_eq!(
            store.list()?,
            &[
                "a/b".try_into()?,
                "a/c".try_into()?,
                "a/d/e".try_into()?,
                "a/f/g".try_into()?,
                "a/f/h".try_into()?,
                "i/j/k".try_into()?
            ]
        );
        assert_eq!(
            store.list_prefix(&"a/f/".try_into()?)?,
            &["a/f/g".try_into()?, "a/f/h".try_into()?]
        );
        assert!(store.list_prefix(&"z/".try_into()?)?.is_empty());

        let list_dir = store.list_dir(&"a/".try_into()?)?;
        assert_eq!(list_dir.keys(), &["a/b".try_into()?, "a/c".try_into()?]);
        assert_eq!(
            list_dir.prefixes(),
            &["a/d/".try_into()?, "a/f/".try_into()?]
        );

        let list_dir = store.list_dir(&StorePrefix::root())?;
        assert!(list_dir.keys().is_empty());
        assert_eq!(list_dir.prefixes(), &["a/".try_into()?, "i/".try_into()?]);

        assert_eq!(store.size_prefix(&"a/".try_into()?)?, 5);
        assert_eq!(store.size()?, 7);
        Ok(())
    }
}
