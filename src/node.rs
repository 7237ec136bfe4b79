//! Hierarchy nodes.
//!
//! A node in a hierarchy is either a [`Dataset`](crate::dataset::Dataset) or a [`Group`](crate::group::Group).
//!
//! A [`Node`] has an associated [`NodePath`], [`NodeMetadata`], and children.
//!
//! The [`Node::hierarchy_tree`] function can be used to create a string representation of the hierarchy below a node.

mod node_metadata;
mod node_name;
mod node_path;

pub use node_metadata::NodeMetadata;
pub use node_name::{NodeName, NodeNameError};
pub use node_path::{NodePath, NodePathError};

use crate::{
    group::GroupMetadata,
    storage::{discover_children, retrieve_metadata, ListableStorageTraits, ReadableStorageTraits, StorageError},
};

/// A hierarchy node.
#[derive(Debug)]
pub struct Node {
    path: NodePath,
    metadata: NodeMetadata,
    /// Only group nodes can have children.
    children: Vec<Node>,
}

impl Node {
    /// Create a new node at `path` with `metadata` and `children`.
    #[must_use]
    pub fn new(path: NodePath, metadata: NodeMetadata, children: Vec<Node>) -> Self {
        Self {
            path,
            metadata,
            children,
        }
    }

    /// Read the node at `path` and all of its descendants from `storage`.
    ///
    /// A root node without a metadata document is treated as an implicit group.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is a storage error, a node has invalid metadata, or there is no node at `path`.
    pub fn open<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits>(
        storage: &TStorage,
        path: &NodePath,
    ) -> Result<Self, StorageError> {
        let metadata = match retrieve_metadata(storage, path)? {
            Some(metadata) => metadata,
            None if path.is_root() => GroupMetadata::default().into(),
            None => return Err(StorageError::Other(format!("no node at {path}"))),
        };
        let children = match metadata {
            NodeMetadata::Dataset(_) => Vec::default(),
            NodeMetadata::Group(_) => discover_children(storage, path)?
                .iter()
                .map(|child| Self::open(storage, child))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(Self::new(path.clone(), metadata, children))
    }

    /// Indicates if a node is the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// Returns the name of the node.
    #[must_use]
    pub fn name(&self) -> NodeName {
        self.path.name()
    }

    /// Returns a reference to the path of the node.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Returns a reference to the metadata of the node.
    #[must_use]
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// Returns a reference to the children of the node.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Return a tree representation of a hierarchy as a string.
    ///
    /// Datasets are annotated with their shape and data type.
    #[must_use]
    pub fn hierarchy_tree(&self) -> String {
        fn print_metadata(name: &str, string: &mut String, metadata: &NodeMetadata) {
            match metadata {
                NodeMetadata::Dataset(dataset_metadata) => {
                    let s = format!(
                        "{} {:?} {}",
                        name, dataset_metadata.shape, dataset_metadata.data_type
                    );
                    string.push_str(&s);
                }
                NodeMetadata::Group(_) => {
                    string.push_str(name);
                }
            }
            string.push('\n');
        }

        fn update_tree(string: &mut String, children: &[Node], depth: usize) {
            for child in children {
                let name = child.name();
                string.push_str(&" ".repeat(depth * 2));
                print_metadata(name.as_str(), string, &child.metadata);
                update_tree(string, &child.children, depth + 1);
            }
        }

        let mut string = String::default();
        print_metadata(self.path.as_str(), &mut string, &self.metadata);
        update_tree(&mut string, &self.children, 1);
        string
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_metadata_group() {
        let json = r#"{"node_type": "group", "zarr_format": 3}"#;
        let metadata: NodeMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata, NodeMetadata::Group(GroupMetadata::default()));
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"node_type":"group","zarr_format":3}"#);
    }

    #[test]
    fn node_metadata_invalid() {
        let json = r#"{"node_type": "link", "zarr_format": 3}"#;
        assert!(serde_json::from_str::<NodeMetadata>(json).is_err());
    }
}
