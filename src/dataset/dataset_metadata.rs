//! Dataset metadata.
//!
//! An example `zarr.json` document of a chunked, compressed, extendible dataset of `float64` records of shape `[3]`:
//! ```json
//! {
//!     "node_type": "array",
//!     "zarr_format": 3,
//!     "shape": [2, 3],
//!     "data_type": "float64",
//!     "chunk_grid": { "name": "regular", "configuration": { "chunk_shape": [1, 3] } },
//!     "chunk_key_encoding": { "name": "default", "configuration": { "separator": "/" } },
//!     "fill_value": 0.0,
//!     "codecs": [
//!         { "name": "bytes", "configuration": { "endian": "little" } },
//!         { "name": "gzip", "configuration": { "level": 6 } }
//!     ],
//!     "dataspace": { "must_understand": false, "maximum_shape": [null, 3], "layout": "chunked" }
//! }
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::{
    codec::{CodecChain, CodecError, CodecMetadata},
    DataType, Dataspace, DataspaceError, MaximumExtent,
};

/// The storage layout of a dataset.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetLayout {
    /// A single uncompressed chunk covering the whole fixed extent.
    #[display("contiguous")]
    Contiguous,
    /// Regular chunks, optionally compressed, optionally extendible.
    #[display("chunked")]
    Chunked,
}

/// The configuration of a regular chunk grid.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct RegularChunkGridConfiguration {
    /// The chunk shape.
    pub chunk_shape: Vec<u64>,
}

/// Chunk grid metadata.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(tag = "name", content = "configuration", rename_all = "lowercase")]
pub enum ChunkGridMetadata {
    /// A regular chunk grid.
    Regular(RegularChunkGridConfiguration),
}

/// A chunk key separator.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Serialize, Deserialize)]
pub enum ChunkKeySeparator {
    /// The `/` character.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
    /// The `.` character.
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
}

/// The configuration of the default chunk key encoding.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct DefaultChunkKeyEncodingConfiguration {
    /// The separator between chunk grid indices.
    pub separator: ChunkKeySeparator,
}

/// Chunk key encoding metadata.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(tag = "name", content = "configuration", rename_all = "lowercase")]
pub enum ChunkKeyEncodingMetadata {
    /// The default chunk key encoding.
    Default(DefaultChunkKeyEncodingConfiguration),
}

/// The `dataspace` extension of dataset metadata.
///
/// Readers that do not understand it can still read the dataset at its current shape.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct DataspaceMetadata {
    /// Always false.
    #[serde(default)]
    pub must_understand: bool,
    /// The maximum shape. `null` marks an unlimited axis.
    pub maximum_shape: Vec<MaximumExtent>,
    /// The storage layout.
    pub layout: DatasetLayout,
}

/// Dataset metadata.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct DatasetMetadata {
    /// The Zarr storage format version. Must be `3`.
    pub zarr_format: usize,
    /// The current shape.
    pub shape: Vec<u64>,
    /// The data type.
    pub data_type: DataType,
    /// The chunk grid.
    pub chunk_grid: ChunkGridMetadata,
    /// The chunk key encoding.
    pub chunk_key_encoding: ChunkKeyEncodingMetadata,
    /// The fill value. Always zero.
    pub fill_value: serde_json::Value,
    /// The codec chain.
    pub codecs: Vec<CodecMetadata>,
    /// The maximum shape and layout.
    pub dataspace: DataspaceMetadata,
}

impl DatasetMetadata {
    /// Create dataset metadata.
    #[must_use]
    pub fn new(
        data_type: DataType,
        dataspace: &Dataspace,
        layout: DatasetLayout,
        chunk_shape: Vec<u64>,
        codec_chain: &CodecChain,
    ) -> Self {
        Self {
            zarr_format: 3,
            shape: dataspace.shape().to_vec(),
            data_type,
            chunk_grid: ChunkGridMetadata::Regular(RegularChunkGridConfiguration { chunk_shape }),
            chunk_key_encoding: ChunkKeyEncodingMetadata::Default(
                DefaultChunkKeyEncodingConfiguration {
                    separator: ChunkKeySeparator::Slash,
                },
            ),
            fill_value: data_type.fill_value_metadata(),
            codecs: codec_chain.create_metadata(),
            dataspace: DataspaceMetadata {
                must_understand: false,
                maximum_shape: dataspace.maximum_shape().to_vec(),
                layout,
            },
        }
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        let ChunkGridMetadata::Regular(configuration) = &self.chunk_grid;
        &configuration.chunk_shape
    }

    /// The storage layout.
    #[must_use]
    pub fn layout(&self) -> DatasetLayout {
        self.dataspace.layout
    }

    /// The dataspace (current and maximum shape).
    ///
    /// # Errors
    /// Returns [`DataspaceError`] if the current shape is inconsistent with the maximum shape.
    pub fn dataspace(&self) -> Result<Dataspace, DataspaceError> {
        Dataspace::new_with_maximum(self.shape.clone(), self.dataspace.maximum_shape.clone())
    }

    /// The codec chain.
    ///
    /// # Errors
    /// Returns [`CodecError`] if the codecs are not supported.
    pub fn codec_chain(&self) -> Result<CodecChain, CodecError> {
        CodecChain::from_metadata(self.data_type, &self.codecs)
    }

    /// The size in bytes of a decoded chunk.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        let elements: u64 = self.chunk_shape().iter().product();
        usize::try_from(elements).unwrap_or(usize::MAX) * self.data_type.size()
    }

    /// Validate the metadata.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.zarr_format != 3 {
            return Err(format!("invalid zarr format {}, expected 3", self.zarr_format));
        }
        let chunk_shape = self.chunk_shape();
        if chunk_shape.len() != self.shape.len() {
            return Err(format!(
                "chunk shape {chunk_shape:?} does not match the rank of shape {:?}",
                self.shape
            ));
        }
        if chunk_shape.contains(&0) {
            return Err(format!("chunk shape {chunk_shape:?} has a zero extent"));
        }
        let ChunkKeyEncodingMetadata::Default(encoding) = &self.chunk_key_encoding;
        if encoding.separator != ChunkKeySeparator::Slash {
            return Err(format!("unsupported chunk key separator {}", encoding.separator));
        }
        if !self.data_type.is_zero_fill_value(&self.fill_value) {
            return Err(format!("unsupported fill value {}", self.fill_value));
        }
        let dataspace = self.dataspace().map_err(|err| err.to_string())?;
        let codec_chain = self.codec_chain().map_err(|err| err.to_string())?;
        if self.layout() == DatasetLayout::Contiguous {
            let single_chunk = self
                .shape
                .iter()
                .zip(chunk_shape)
                .all(|(&extent, &chunk)| chunk == extent.max(1));
            if dataspace.is_extendible() || codec_chain.is_compressed() || !single_chunk {
                return Err(
                    "a contiguous dataset must be fixed, uncompressed, and a single chunk"
                        .to_string(),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{dataset::GzipCompressionLevel, node::NodeMetadata};

    use super::*;

    fn records_metadata() -> DatasetMetadata {
        let dataspace = Dataspace::new_with_maximum(
            vec![2, 3],
            vec![MaximumExtent::Unlimited, MaximumExtent::Finite(3)],
        )
        .unwrap();
        DatasetMetadata::new(
            DataType::Float64,
            &dataspace,
            DatasetLayout::Chunked,
            vec![1, 3],
            &CodecChain::new(DataType::Float64, Some(GzipCompressionLevel::DEFAULT)),
        )
    }

    #[test]
    fn dataset_metadata_round_trip() {
        let metadata: NodeMetadata = records_metadata().into();
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.starts_with(r#"{"node_type":"array","zarr_format":3,"shape":[2,3]"#));
        assert!(json.contains(
            r#""dataspace":{"must_understand":false,"maximum_shape":[null,3],"layout":"chunked"}"#
        ));
        let parsed: NodeMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
        let NodeMetadata::Dataset(parsed) = parsed else {
            panic!("expected dataset metadata")
        };
        parsed.validate().unwrap();
        assert_eq!(parsed.chunk_shape(), &[1, 3]);
        assert_eq!(parsed.chunk_size(), 24);
        assert!(parsed.dataspace().unwrap().is_extendible());
    }

    #[test]
    fn dataset_metadata_invalid() {
        let mut metadata = records_metadata();
        metadata.fill_value = serde_json::json!(1.0);
        assert!(metadata.validate().is_err());

        let mut metadata = records_metadata();
        metadata.chunk_grid = ChunkGridMetadata::Regular(RegularChunkGridConfiguration {
            chunk_shape: vec![1, 0],
        });
        assert!(metadata.validate().is_err());

        let mut metadata = records_metadata();
        metadata.dataspace.layout = DatasetLayout::Contiguous;
        assert!(metadata.validate().is_err());

        let mut metadata = records_metadata();
        metadata.shape = vec![2, 4];
        assert!(metadata.validate().is_err());
    }
}
