//! The `gzip` codec.
//!
//! Applies gzip compression to the bytes of a chunk.

use std::io::{Cursor, Read};

use derive_more::Display;
use flate2::bufread::{GzDecoder, GzEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::CodecError;

/// A `gzip` compression level. An integer from 0 to 9.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
#[serde(try_from = "u32", into = "u32")]
pub struct GzipCompressionLevel(u32);

/// An invalid `gzip` compression level.
#[derive(Debug, Error)]
#[error("invalid gzip compression level {0}, must be 0-9")]
pub struct GzipCompressionLevelError(u32);

impl GzipCompressionLevel {
    /// The default compression level (6).
    pub const DEFAULT: Self = Self(6);

    /// Return the compression level as a [`u32`].
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for GzipCompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for GzipCompressionLevel {
    type Error = GzipCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level < 10 {
            Ok(Self(level))
        } else {
            Err(GzipCompressionLevelError(level))
        }
    }
}

impl From<GzipCompressionLevel> for u32 {
    fn from(level: GzipCompressionLevel) -> Self {
        level.0
    }
}

/// Configuration parameters for the `gzip` codec.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct GzipCodecConfiguration {
    /// The compression level.
    pub level: GzipCompressionLevel,
}

/// A `gzip` codec implementation.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    compression_level: GzipCompressionLevel,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    #[must_use]
    pub const fn new(compression_level: GzipCompressionLevel) -> Self {
        Self { compression_level }
    }

    /// Create a new `gzip` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &GzipCodecConfiguration) -> Self {
        Self {
            compression_level: configuration.level,
        }
    }

    /// Return the configuration of the codec.
    #[must_use]
    pub const fn configuration(&self) -> GzipCodecConfiguration {
        GzipCodecConfiguration {
            level: self.compression_level,
        }
    }

    /// Compress `decoded_value`.
    ///
    /// # Errors
    /// Returns [`CodecError`] if compression fails.
    pub fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Decompress `encoded_value`.
    ///
    /// # Errors
    /// Returns [`CodecError`] if `encoded_value` is not valid gzip data.
    pub fn decode(&self, encoded_value: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut decoder = GzDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_gzip_configuration_valid() {
        const JSON_VALID: &str = r#"{
            "level": 1
        }"#;
        let configuration: GzipCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        assert_eq!(configuration.level.as_u32(), 1);
    }

    #[test]
    fn codec_gzip_configuration_invalid() {
        assert!(serde_json::from_str::<GzipCodecConfiguration>(r#"{"level": -1}"#).is_err());
        assert!(serde_json::from_str::<GzipCodecConfiguration>(r#"{"level": 10}"#).is_err());
        assert!(GzipCompressionLevel::try_from(10).is_err());
    }

    #[test]
    fn codec_gzip_round_trip() {
        let bytes: Vec<u8> = (0..64u16).flat_map(u16::to_ne_bytes).collect();
        let codec = GzipCodec::new(GzipCompressionLevel::DEFAULT);
        let encoded = codec.encode(bytes.clone()).unwrap();
        assert_ne!(encoded, bytes);
        assert_eq!(codec.decode(&encoded).unwrap(), bytes);
        assert!(codec.decode(&bytes).is_err());
    }
}
