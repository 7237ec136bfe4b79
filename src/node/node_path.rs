use derive_more::Display;
use thiserror::Error;

use crate::storage::StorePrefix;

use super::NodeName;

/// A hierarchy node path.
///
/// A path always starts with `/`. The root path is `/`, and every other path is a `/` separated sequence of valid [`NodeName`]s, such as `/a/b`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Debug, Error)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

impl NodePath {
    /// Create a new node path from `path`.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `path` is not valid according to [`NodePath::validate`()].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(NodePathError(path.to_string()))
        }
    }

    /// The root node.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Extracts a string slice containing the node path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a path:
    /// - a path always starts with `/`,
    /// - a non-root path cannot end with `/`, and
    /// - every segment of a non-root path must be a valid non-root [`NodeName`].
    #[must_use]
    pub fn validate(path: &str) -> bool {
        path.eq("/")
            || path.strip_prefix('/').is_some_and(|path| {
                path.split('/')
                    .all(|name| !name.is_empty() && NodeName::validate(name))
            })
    }

    /// Returns the name of the node. The root node has an empty name.
    #[must_use]
    pub fn name(&self) -> NodeName {
        let name = self.0.rsplit('/').next().unwrap_or_default();
        unsafe { NodeName::new_unchecked(name) }
    }

    /// Returns the path of the parent node, or [`None`] for the root node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('/') {
            Some(("", _)) | None => Some(Self::root()),
            Some((parent, _)) => Some(Self(parent.to_string())),
        }
    }

    /// Returns the paths of all ancestors of the node, starting at the root.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors: Vec<Self> = std::iter::successors(self.parent(), Self::parent).collect();
        ancestors.reverse();
        ancestors
    }

    /// Resolve `name` relative to this path.
    ///
    /// A `name` starting with `/` is an absolute path, otherwise it may contain multiple `/` separated node names.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if the resolved path is not valid.
    pub fn resolve(&self, name: &str) -> Result<Self, NodePathError> {
        if name.starts_with('/') {
            Self::new(name)
        } else if self.is_root() {
            Self::new(&format!("/{name}"))
        } else {
            Self::new(&format!("{}/{name}", self.0))
        }
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<&StorePrefix> for NodePath {
    type Error = NodePathError;

    fn try_from(prefix: &StorePrefix) -> Result<Self, Self::Error> {
        let path = prefix.as_str();
        let path = path.strip_suffix('/').unwrap_or(path);
        Self::new(&format!("/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_path() {
        assert!(NodePath::new("/").is_ok());
        assert!(NodePath::new("/a/b").is_ok());
        assert_eq!(NodePath::new("/a/b").unwrap().to_string(), "/a/b");
        assert!(NodePath::new("").is_err());
        assert!(NodePath::new("a/b").is_err());
        assert!(NodePath::new("/a/b/").is_err());
        assert!(NodePath::new("/a//b").is_err());
        assert!(NodePath::new("/a/../b").is_err());
        assert!(NodePath::new("/__reserved").is_err());
        assert_eq!(
            NodePath::new("/a/b/").unwrap_err().to_string(),
            "invalid node path /a/b/"
        );
    }

    #[test]
    fn node_path_navigation() {
        let path = NodePath::new("/a/b/c").unwrap();
        assert_eq!(path.name().as_str(), "c");
        assert_eq!(path.parent(), Some(NodePath::new("/a/b").unwrap()));
        assert_eq!(
            path.ancestors(),
            vec![
                NodePath::root(),
                NodePath::new("/a").unwrap(),
                NodePath::new("/a/b").unwrap()
            ]
        );
        assert_eq!(NodePath::new("/a").unwrap().parent(), Some(NodePath::root()));
        assert_eq!(NodePath::root().parent(), None);
        assert!(NodePath::root().ancestors().is_empty());
        assert!(NodePath::root().name().is_root());
    }

    #[test]
    fn node_path_resolve() {
        let root = NodePath::root();
        let group = NodePath::new("/g").unwrap();
        assert_eq!(root.resolve("x").unwrap().as_str(), "/x");
        assert_eq!(group.resolve("x/y").unwrap().as_str(), "/g/x/y");
        assert_eq!(group.resolve("/x").unwrap().as_str(), "/x");
        assert!(group.resolve("").is_err());
        assert!(group.resolve("x/").is_err());
    }

    #[test]
    fn node_path_from_prefix() {
        let prefix = StorePrefix::new("a/b/").unwrap();
        assert_eq!(NodePath::try_from(&prefix).unwrap().as_str(), "/a/b");
        assert!(NodePath::try_from(&StorePrefix::root()).unwrap().is_root());
    }
}
