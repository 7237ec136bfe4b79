//! Groups.
//!
//! A group is a node in a hierarchy which may have child nodes (groups or [datasets](crate::dataset)).
//! Every group has a `zarr.json` metadata document:
//! ```json
//! {
//!     "node_type": "group",
//!     "zarr_format": 3
//! }
//! ```
//! The root group (`/`) always exists, even if its metadata has not been written yet.
//!
//! A [`Group`] is a lightweight handle, the location against which dataset names are resolved.
//! Use [`Group::root`] or [`Group::open`] to obtain one, and [`Group::open_or_create_group`] to create a group together with any missing intermediate groups.

mod group_metadata;

use std::sync::Arc;

use thiserror::Error;

use crate::{
    dataset::{Dataset, DatasetError},
    node::{Node, NodeMetadata, NodePath, NodePathError},
    storage::{
        retrieve_metadata, store_metadata, ListableStorageTraits, ReadableStorageTraits,
        ReadableWritableStorageTraits, StorageError,
    },
};

pub use self::group_metadata::GroupMetadata;

/// A group handle.
#[derive(Debug)]
pub struct Group<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    path: NodePath,
}

impl<TStorage: ?Sized> Clone for Group<TStorage> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            path: self.path.clone(),
        }
    }
}

/// A group error.
#[derive(Debug, Error)]
pub enum GroupError {
    /// There is no node at the path.
    #[error("group {0} does not exist")]
    NotFound(NodePath),
    /// The node at the path is not a group.
    #[error("node {0} is not a group")]
    NotAGroup(NodePath),
    /// The group could not be created.
    #[error("failed to create group {0}: {1}")]
    CreationError(NodePath, String),
    /// An invalid node path.
    #[error(transparent)]
    InvalidPath(#[from] NodePathError),
    /// Invalid group metadata.
    #[error("invalid metadata for group {0}: {1}")]
    InvalidMetadata(NodePath, String),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl<TStorage: ?Sized> Group<TStorage> {
    /// Returns a handle to the root group of `storage`.
    #[must_use]
    pub fn root(storage: Arc<TStorage>) -> Self {
        Self {
            storage,
            path: NodePath::root(),
        }
    }

    /// Get the path of the group.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<TStorage> {
        &self.storage
    }

    /// Resolve `name` relative to this group.
    ///
    /// A `name` starting with `/` is resolved from the root, otherwise it may hold several `/` separated node names.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if the resolved path is invalid.
    pub fn resolve(&self, name: &str) -> Result<NodePath, NodePathError> {
        self.path.resolve(name)
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Group<TStorage> {
    /// Open the existing group in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`GroupError`] if the path is invalid, there is no group at `path`, or its metadata is invalid.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, GroupError> {
        let path = NodePath::new(path)?;
        Self::open_path(storage, path)
    }

    /// Open the existing group in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`GroupError`] if there is no group at `path` or its metadata is invalid.
    pub fn open_path(storage: Arc<TStorage>, path: NodePath) -> Result<Self, GroupError> {
        match retrieve_metadata(&*storage, &path)? {
            Some(NodeMetadata::Group(metadata)) => {
                validate_group_metadata(&path, &metadata)?;
                Ok(Self { storage, path })
            }
            Some(NodeMetadata::Dataset(_)) => Err(GroupError::NotAGroup(path)),
            None if path.is_root() => Ok(Self { storage, path }),
            None => Err(GroupError::NotFound(path)),
        }
    }

    /// Open the existing group at `name`, resolved relative to this group.
    ///
    /// # Errors
    /// Returns [`GroupError`] if the path is invalid, there is no group at the path, or its metadata is invalid.
    pub fn open_group(&self, name: &str) -> Result<Self, GroupError> {
        Self::open_path(self.storage.clone(), self.resolve(name)?)
    }

    /// Open the existing dataset at `name`, resolved relative to this group.
    ///
    /// # Errors
    /// Returns [`DatasetError::NotFound`] if there is no dataset at the path, or another [`DatasetError`] if the path or metadata is invalid.
    pub fn open_dataset(&self, name: &str) -> Result<Dataset<TStorage>, DatasetError> {
        Dataset::open_path(self.storage.clone(), self.resolve(name)?)
    }

    /// Returns true if there is a group at `name`, resolved relative to this group.
    ///
    /// This never fails: an invalid path, a missing node, a dataset, or a storage error all return false.
    #[must_use]
    pub fn exists_group(&self, name: &str) -> bool {
        self.resolve(name).is_ok_and(|path| {
            matches!(
                retrieve_metadata(&*self.storage, &path),
                Ok(Some(NodeMetadata::Group(_)))
            ) || path.is_root()
        })
    }

    /// Returns true if there is a dataset at `name`, resolved relative to this group.
    ///
    /// This never fails: an invalid path, a missing node, a group, or a storage error all return false.
    #[must_use]
    pub fn exists_dataset(&self, name: &str) -> bool {
        self.resolve(name).is_ok_and(|path| {
            matches!(
                retrieve_metadata(&*self.storage, &path),
                Ok(Some(NodeMetadata::Dataset(_)))
            )
        })
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits> Group<TStorage> {
    /// Read the hierarchy below this group.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying error with the store or a node has invalid metadata.
    pub fn hierarchy(&self) -> Result<Node, StorageError> {
        Node::open(&*self.storage, &self.path)
    }
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Group<TStorage> {
    /// Open the group at `name` (resolved relative to this group), creating it and any missing intermediate groups if it does not exist.
    ///
    /// Calling this again once all groups exist does not modify the store.
    ///
    /// # Errors
    /// Returns [`GroupError::CreationError`] if the group or an intermediate group cannot be created, for example because a dataset exists at one of the paths.
    /// Returns [`GroupError::InvalidPath`] if `name` does not resolve to a valid path.
    pub fn open_or_create_group(&self, name: &str) -> Result<Self, GroupError> {
        let path = self.resolve(name)?;
        match Self::open_path(self.storage.clone(), path.clone()) {
            Ok(group) => Ok(group),
            Err(GroupError::NotFound(_)) => {
                create_intermediate_groups(&*self.storage, &path)?;
                create_group(&*self.storage, &path)?;
                Ok(Self {
                    storage: self.storage.clone(),
                    path,
                })
            }
            Err(err) => Err(GroupError::CreationError(path, err.to_string())),
        }
    }
}

fn validate_group_metadata(path: &NodePath, metadata: &GroupMetadata) -> Result<(), GroupError> {
    if metadata.validate_format() {
        Ok(())
    } else {
        Err(GroupError::InvalidMetadata(
            path.clone(),
            format!("invalid zarr format {}, expected 3", metadata.zarr_format),
        ))
    }
}

fn create_group<TStorage: ?Sized + ReadableWritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<(), GroupError> {
    store_metadata(storage, path, &GroupMetadata::default().into())
        .map_err(|err| GroupError::CreationError(path.clone(), err.to_string()))
}

/// Create every missing ancestor group of `path`, including the root group.
///
/// Existing ancestor groups are left untouched.
///
/// # Errors
/// Returns [`GroupError::CreationError`] if an ancestor is a dataset, has invalid metadata, or cannot be written.
pub fn create_intermediate_groups<TStorage: ?Sized + ReadableWritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<(), GroupError> {
    for ancestor in path.ancestors() {
        match retrieve_metadata(storage, &ancestor) {
            Ok(Some(NodeMetadata::Group(_))) => {}
            Ok(Some(NodeMetadata::Dataset(_))) => {
                return Err(GroupError::CreationError(
                    path.clone(),
                    format!("{ancestor} is a dataset"),
                ));
            }
            Ok(None) => create_group(storage, &ancestor)?,
            Err(err) => return Err(GroupError::CreationError(path.clone(), err.to_string())),
        }
    }
    Ok(())
}
