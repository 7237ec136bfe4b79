//! Data types and endianness.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A data type.
///
/// Each data type is the storage tag of exactly one [`Element`](super::Element) type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// `bool` Boolean.
    #[display("bool")]
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    #[display("int8")]
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    #[display("int16")]
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    #[display("int32")]
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    #[display("int64")]
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    #[display("uint8")]
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    #[display("uint16")]
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    #[display("uint32")]
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    #[display("uint64")]
    UInt64,
    /// `float16` IEEE 754 half-precision floating point.
    #[display("float16")]
    Float16,
    /// `float32` IEEE 754 single-precision floating point.
    #[display("float32")]
    Float32,
    /// `float64` IEEE 754 double-precision floating point.
    #[display("float64")]
    Float64,
    /// `complex64` real and complex components are each IEEE 754 single-precision floating point.
    #[display("complex64")]
    Complex64,
    /// `complex128` real and complex components are each IEEE 754 double-precision floating point.
    #[display("complex128")]
    Complex128,
}

impl DataType {
    /// The size of one element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    /// The size in bytes of each byte-swapped component of an element.
    ///
    /// This is the element size, except for complex types which swap their real and imaginary parts separately.
    #[must_use]
    pub const fn component_size(&self) -> usize {
        match self {
            Self::Complex64 => 4,
            Self::Complex128 => 8,
            _ => self.size(),
        }
    }

    /// The fill value of the data type as stored in metadata. All fill values are zero.
    #[must_use]
    pub fn fill_value_metadata(&self) -> serde_json::Value {
        match self {
            Self::Bool => serde_json::Value::Bool(false),
            Self::Float16 | Self::Float32 | Self::Float64 => serde_json::json!(0.0),
            Self::Complex64 | Self::Complex128 => serde_json::json!([0.0, 0.0]),
            _ => serde_json::json!(0),
        }
    }

    /// Returns true if `fill_value` is a zero fill value of this data type.
    #[must_use]
    pub fn is_zero_fill_value(&self, fill_value: &serde_json::Value) -> bool {
        fn is_zero(value: &serde_json::Value) -> bool {
            value.as_f64() == Some(0.0)
        }
        match (self, fill_value) {
            (Self::Bool, serde_json::Value::Bool(value)) => !value,
            (Self::Complex64 | Self::Complex128, serde_json::Value::Array(parts)) => {
                parts.len() == 2 && parts.iter().all(is_zero)
            }
            (Self::Bool | Self::Complex64 | Self::Complex128, _) => false,
            (_, value) => is_zero(value),
        }
    }
}

/// The endianness of each element.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,
    /// Big endian.
    #[display("big")]
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reverse the byte order of each `component_size` component of `bytes` in place.
pub(crate) fn reverse_endianness(bytes: &mut [u8], component_size: usize) {
    if component_size > 1 {
        bytes
            .chunks_exact_mut(component_size)
            .for_each(<[u8]>::reverse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_names() {
        assert_eq!(DataType::Complex128.to_string(), "complex128");
        assert_eq!(
            serde_json::to_string(&DataType::UInt16).unwrap(),
            r#""uint16""#
        );
        assert_eq!(
            serde_json::from_str::<DataType>(r#""float16""#).unwrap(),
            DataType::Float16
        );
        assert!(serde_json::from_str::<DataType>(r#""string""#).is_err());
    }

    #[test]
    fn data_type_fill_values() {
        for data_type in [DataType::Bool, DataType::Int32, DataType::Float64, DataType::Complex64] {
            assert!(data_type.is_zero_fill_value(&data_type.fill_value_metadata()));
        }
        assert!(!DataType::Int32.is_zero_fill_value(&serde_json::json!(1)));
        assert!(!DataType::Bool.is_zero_fill_value(&serde_json::json!(0)));
        assert!(!DataType::Complex64.is_zero_fill_value(&serde_json::json!([0.0, 1.0])));
    }

    #[test]
    fn endianness_reverse() {
        let mut bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        reverse_endianness(&mut bytes, 4);
        assert_eq!(bytes, vec![4, 3, 2, 1, 8, 7, 6, 5]);
        reverse_endianness(&mut bytes, 1);
        assert_eq!(bytes, vec![4, 3, 2, 1, 8, 7, 6, 5]);
    }
}
