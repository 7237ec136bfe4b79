//! Chunk codecs.
//!
//! A chunk is encoded by the `bytes` codec (elements in a recorded endianness), optionally followed by the [`gzip`](GzipCodec) codec.
//! The codec chain of a dataset is recorded in its metadata, for example:
//! ```json
//! "codecs": [
//!     { "name": "bytes", "configuration": { "endian": "little" } },
//!     { "name": "gzip", "configuration": { "level": 6 } }
//! ]
//! ```

mod gzip;

pub use gzip::{
    GzipCodec, GzipCodecConfiguration, GzipCompressionLevel, GzipCompressionLevelError,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    data_type::{reverse_endianness, Endianness, NATIVE_ENDIAN},
    DataType,
};

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A decoded chunk has an unexpected size.
    #[error("decoded chunk has {got} bytes, expected {expected}")]
    UnexpectedChunkDecodedSize {
        /// The number of decoded bytes.
        got: usize,
        /// The expected number of decoded bytes.
        expected: usize,
    },
    /// The codec chain is not supported.
    #[error("unsupported codec chain: {0}")]
    UnsupportedCodecChain(String),
}

/// Configuration parameters for the `bytes` codec.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct BytesCodecConfiguration {
    /// The endianness of multi-byte elements. May be omitted for single byte data types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endian: Option<Endianness>,
}

/// Codec metadata.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(tag = "name", content = "configuration", rename_all = "lowercase")]
pub enum CodecMetadata {
    /// The `bytes` codec.
    Bytes(BytesCodecConfiguration),
    /// The `gzip` codec.
    Gzip(GzipCodecConfiguration),
}

/// The codec chain of a dataset.
#[derive(Clone, Debug)]
pub struct CodecChain {
    data_type: DataType,
    endian: Endianness,
    gzip: Option<GzipCodec>,
}

impl CodecChain {
    /// Create a codec chain storing elements of `data_type` in native endianness, compressed if `compression` is set.
    #[must_use]
    pub fn new(data_type: DataType, compression: Option<GzipCompressionLevel>) -> Self {
        Self {
            data_type,
            endian: NATIVE_ENDIAN,
            gzip: compression.map(GzipCodec::new),
        }
    }

    /// Create a codec chain from codec metadata.
    ///
    /// # Errors
    /// Returns [`CodecError::UnsupportedCodecChain`] unless `codecs` is a `bytes` codec optionally followed by a `gzip` codec.
    pub fn from_metadata(data_type: DataType, codecs: &[CodecMetadata]) -> Result<Self, CodecError> {
        let unsupported = || {
            CodecError::UnsupportedCodecChain(
                serde_json::to_string(codecs).unwrap_or_default(),
            )
        };
        let (endian, gzip) = match codecs {
            [CodecMetadata::Bytes(bytes)] => (bytes.endian, None),
            [CodecMetadata::Bytes(bytes), CodecMetadata::Gzip(gzip)] => {
                (bytes.endian, Some(GzipCodec::new_with_configuration(gzip)))
            }
            _ => return Err(unsupported()),
        };
        let endian = match endian {
            Some(endian) => endian,
            None if data_type.size() == 1 => NATIVE_ENDIAN,
            None => return Err(unsupported()),
        };
        Ok(Self {
            data_type,
            endian,
            gzip,
        })
    }

    /// Create the codec metadata of the chain.
    #[must_use]
    pub fn create_metadata(&self) -> Vec<CodecMetadata> {
        let mut codecs = vec![CodecMetadata::Bytes(BytesCodecConfiguration {
            endian: Some(self.endian),
        })];
        if let Some(gzip) = &self.gzip {
            codecs.push(CodecMetadata::Gzip(gzip.configuration()));
        }
        codecs
    }

    /// Returns true if the chain compresses chunks.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.gzip.is_some()
    }

    /// Encode native endian chunk bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if compression fails.
    pub fn encode(&self, mut decoded: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if !self.endian.is_native() {
            reverse_endianness(&mut decoded, self.data_type.component_size());
        }
        match &self.gzip {
            Some(gzip) => gzip.encode(decoded),
            None => Ok(decoded),
        }
    }

    /// Decode an encoded chunk to native endian bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decompression fails or the decoded chunk does not have `expected_size` bytes.
    pub fn decode(&self, encoded: &[u8], expected_size: usize) -> Result<Vec<u8>, CodecError> {
        let mut decoded = match &self.gzip {
            Some(gzip) => gzip.decode(encoded)?,
            None => encoded.to_vec(),
        };
        if decoded.len() != expected_size {
            return Err(CodecError::UnexpectedChunkDecodedSize {
                got: decoded.len(),
                expected: expected_size,
            });
        }
        if !self.endian.is_native() {
            reverse_endianness(&mut decoded, self.data_type.component_size());
        }
        Ok(decoded)
    }
}
