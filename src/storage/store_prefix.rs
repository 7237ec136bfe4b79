use derive_more::{Display, From};
use thiserror::Error;

use crate::node::NodePath;

/// A store prefix.
///
/// A prefix is either empty (the root) or a `/` terminated string such as `a/b/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StorePrefix(String);

/// An invalid store prefix.
#[derive(Debug, Error, From)]
#[error("invalid store prefix {0}")]
pub struct StorePrefixError(String);

/// A list of [`StorePrefix`].
pub type StorePrefixes = Vec<StorePrefix>;

impl StorePrefix {
    /// Create a new store prefix from `prefix`.
    ///
    /// # Errors
    /// Returns [`StorePrefixError`] if `prefix` is not valid according to [`StorePrefix::validate`()].
    pub fn new(prefix: impl Into<String>) -> Result<Self, StorePrefixError> {
        let prefix = prefix.into();
        if Self::validate(&prefix) {
            Ok(Self(prefix))
        } else {
            Err(StorePrefixError(prefix))
        }
    }

    /// Create a new store prefix from `prefix` without validation.
    ///
    /// # Safety
    /// `prefix` is not validated, so this can result in an invalid store prefix.
    #[must_use]
    pub unsafe fn new_unchecked(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        debug_assert!(Self::validate(&prefix));
        Self(prefix)
    }

    /// The root prefix.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Extracts a string slice of the prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a prefix.
    #[must_use]
    pub fn validate(prefix: &str) -> bool {
        prefix.is_empty() || (prefix.ends_with('/') && !prefix.starts_with('/'))
    }
}

impl TryFrom<&str> for StorePrefix {
    type Error = StorePrefixError;

    fn try_from(prefix: &str) -> Result<Self, StorePrefixError> {
        Self::new(prefix)
    }
}

impl From<&NodePath> for StorePrefix {
    fn from(path: &NodePath) -> Self {
        let path = path.as_str();
        if path.eq("/") {
            Self::root()
        } else {
            let path = path.strip_prefix('/').unwrap_or(path);
            unsafe { Self::new_unchecked(format!("{path}/")) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid() {
        assert!(StorePrefix::new("").is_ok());
        assert!(StorePrefix::new("a/").is_ok());
        assert!(StorePrefix::new("a/b/").is_ok());
        assert_eq!(StorePrefix::try_from("a/").unwrap().to_string(), "a/");
    }

    #[test]
    fn invalid() {
        assert!(StorePrefix::new("a").is_err());
        assert!(StorePrefix::new("/a/").is_err());
        assert_eq!(
            StorePrefix::new("a/b").unwrap_err().to_string(),
            "invalid store prefix a/b"
        );
    }

    #[test]
    fn from_node_path() {
        assert_eq!(StorePrefix::from(&NodePath::root()), StorePrefix::root());
        assert_eq!(
            StorePrefix::from(&NodePath::new("/a/b").unwrap()).as_str(),
            "a/b/"
        );
    }
}
