use serde::{Deserialize, Serialize};

use crate::{dataset::DatasetMetadata, group::GroupMetadata};

/// Node metadata ([`DatasetMetadata`] or [`GroupMetadata`]).
///
/// Serialised as the `zarr.json` document of a node, distinguished by its `node_type` field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "node_type", rename_all = "lowercase")]
pub enum NodeMetadata {
    /// Dataset metadata, stored with the node type `array`.
    #[serde(rename = "array")]
    Dataset(DatasetMetadata),
    /// Group metadata.
    Group(GroupMetadata),
}

impl From<DatasetMetadata> for NodeMetadata {
    fn from(metadata: DatasetMetadata) -> Self {
        Self::Dataset(metadata)
    }
}

impl From<GroupMetadata> for NodeMetadata {
    fn from(metadata: GroupMetadata) -> Self {
        Self::Group(metadata)
    }
}
