use serde::{Deserialize, Serialize};

/// Group metadata.
///
/// For example:
/// ```json
/// {
///     "node_type": "group",
///     "zarr_format": 3
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GroupMetadata {
    /// The Zarr storage format version of the group. Must be `3`.
    pub zarr_format: usize,
}

impl Default for GroupMetadata {
    fn default() -> Self {
        Self { zarr_format: 3 }
    }
}

impl GroupMetadata {
    /// Validates that the `zarr_format` field is `3`.
    #[must_use]
    pub const fn validate_format(&self) -> bool {
        self.zarr_format == 3
    }
}
