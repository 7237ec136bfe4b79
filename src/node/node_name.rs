use thiserror::Error;

/// A hierarchy node name.
///
/// The name of a node is the last segment of its [`NodePath`](super::NodePath).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeName(String);

/// An invalid node name.
#[derive(Debug, Error)]
#[error("invalid node name {0}")]
pub struct NodeNameError(String);

impl NodeName {
    /// Create a new node name from `name`.
    ///
    /// # Errors
    /// Returns [`NodeNameError`] if `name` is not valid according to [`NodeName::validate`()].
    pub fn new(name: &str) -> Result<Self, NodeNameError> {
        if Self::validate(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(NodeNameError(name.to_string()))
        }
    }

    /// Create a new node name from `name` without validation.
    ///
    /// # Safety
    /// `name` is not validated, so this can result in an invalid node name.
    #[must_use]
    pub unsafe fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The name of the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Extracts a string slice containing the node name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a node name:
    /// - the root node does not have a name and is the empty string "". Otherwise,
    /// - must not include the character "/",
    /// - must not be a string composed only of period characters, e.g. "." or "..", and
    /// - must not start with the reserved prefix "__".
    #[must_use]
    pub fn validate(node_name: &str) -> bool {
        node_name.is_empty()
            || (!node_name.contains('/')
                && !node_name.starts_with("__")
                && !node_name.chars().all(|c| c == '.'))
    }

    /// Indicates if a node has the root node name ("").
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_name() {
        assert!(NodeName::new("records").is_ok());
        assert!(NodeName::new("a.b").is_ok());
        assert!(NodeName::new("").unwrap().is_root());
        assert!(NodeName::new("a/b").is_err());
        assert!(NodeName::new("..").is_err());
        assert!(NodeName::new("__x").is_err());
        assert_eq!(
            NodeName::new("..").unwrap_err().to_string(),
            "invalid node name .."
        );
    }
}
