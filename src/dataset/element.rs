//! Element types.

use std::fmt::Debug;

use thiserror::Error;

use super::DataType;

/// An element conversion error.
#[derive(Debug, Error)]
pub enum ElementError {
    /// The number of bytes is not a multiple of the element size.
    #[error("{length} bytes is not a multiple of the {data_type} element size {size}")]
    InvalidBytesLength {
        /// The data type.
        data_type: DataType,
        /// The element size.
        size: usize,
        /// The number of bytes.
        length: usize,
    },
    /// A byte does not hold a valid element value.
    #[error("invalid {data_type} element value {value}")]
    InvalidElementValue {
        /// The data type.
        data_type: DataType,
        /// The first invalid byte.
        value: u8,
    },
}

/// A trait representing a dataset element type.
///
/// An element type maps to exactly one [`DataType`], and converts between element slices and native endian bytes.
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// The data type of the element.
    const DATA_TYPE: DataType;

    /// Convert a slice of elements to native endian bytes.
    fn to_bytes(elements: &[Self]) -> Vec<u8>;

    /// Convert native endian bytes to elements.
    ///
    /// # Errors
    /// Returns [`ElementError`] if the length of `bytes` is not a multiple of the element size or a value is invalid.
    fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ElementError>;
}

fn validate_length(data_type: DataType, bytes: &[u8]) -> Result<(), ElementError> {
    if bytes.len() % data_type.size() == 0 {
        Ok(())
    } else {
        Err(ElementError::InvalidBytesLength {
            data_type,
            size: data_type.size(),
            length: bytes.len(),
        })
    }
}

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn to_bytes(elements: &[Self]) -> Vec<u8> {
        elements.iter().map(|&element| u8::from(element)).collect()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ElementError> {
        match bytes.iter().find(|&&byte| byte > 1) {
            Some(&value) => Err(ElementError::InvalidElementValue {
                data_type: DataType::Bool,
                value,
            }),
            None => Ok(bytes.iter().map(|&byte| byte == 1).collect()),
        }
    }
}

macro_rules! impl_element_pod {
    ($raw_type:ty, $data_type:expr) => {
        impl Element for $raw_type {
            const DATA_TYPE: DataType = $data_type;

            fn to_bytes(elements: &[Self]) -> Vec<u8> {
                bytemuck::cast_slice(elements).to_vec()
            }

            fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ElementError> {
                validate_length(Self::DATA_TYPE, bytes)?;
                Ok(bytemuck::pod_collect_to_vec(bytes))
            }
        }
    };
}

impl_element_pod!(i8, DataType::Int8);
impl_element_pod!(i16, DataType::Int16);
impl_element_pod!(i32, DataType::Int32);
impl_element_pod!(i64, DataType::Int64);
impl_element_pod!(u8, DataType::UInt8);
impl_element_pod!(u16, DataType::UInt16);
impl_element_pod!(u32, DataType::UInt32);
impl_element_pod!(u64, DataType::UInt64);
impl_element_pod!(half::f16, DataType::Float16);
impl_element_pod!(f32, DataType::Float32);
impl_element_pod!(f64, DataType::Float64);
impl_element_pod!(num_complex::Complex32, DataType::Complex64);
impl_element_pod!(num_complex::Complex64, DataType::Complex128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_bool() {
        assert_eq!(bool::to_bytes(&[true, false]), vec![1, 0]);
        assert_eq!(bool::from_bytes(&[0, 1]).unwrap(), vec![false, true]);
        assert!(bool::from_bytes(&[2]).is_err());
    }

    #[test]
    fn element_pod() {
        let elements = [1.5f64, -2.0];
        let bytes = f64::to_bytes(&elements);
        assert_eq!(bytes.len(), 16);
        assert_eq!(f64::from_bytes(&bytes).unwrap(), elements);
        // unaligned input
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);
        assert_eq!(f64::from_bytes(&shifted[1..]).unwrap(), elements);
        assert!(f64::from_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn element_complex() {
        let elements = [num_complex::Complex32::new(1.0, -1.0)];
        let bytes = num_complex::Complex32::to_bytes(&elements);
        assert_eq!(bytes.len(), DataType::Complex64.size());
        assert_eq!(
            num_complex::Complex32::from_bytes(&bytes).unwrap(),
            elements
        );
    }
}
