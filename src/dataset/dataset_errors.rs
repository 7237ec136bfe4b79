use thiserror::Error;

use crate::{
    node::{NodePath, NodePathError},
    storage::StorageError,
};

use super::{codec::CodecError, DataType, DataspaceError, ElementError, HyperslabError};

/// The cause of a failed raw read or write.
#[derive(Debug, Error)]
pub enum RawIoError {
    /// A storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// An element conversion error.
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// A dataset error.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// There is no dataset at the path.
    #[error("dataset {0} does not exist")]
    NotFound(NodePath),
    /// The dataset could not be created.
    #[error("failed to create dataset {0}: {1}")]
    CreationError(NodePath, String),
    /// The rank or shape of a value disagrees with the dataset.
    #[error("dataset {path} has shape {actual:?}, expected {expected}")]
    ShapeMismatch {
        /// The dataset path.
        path: NodePath,
        /// A description of the expected rank or shape.
        expected: String,
        /// The shape of the dataset.
        actual: Vec<u64>,
    },
    /// The element type of a value disagrees with the data type of the dataset.
    #[error("dataset {path} has data type {actual}, expected {expected}")]
    IncompatibleDataType {
        /// The dataset path.
        path: NodePath,
        /// The data type of the value elements.
        expected: DataType,
        /// The data type of the dataset.
        actual: DataType,
    },
    /// A record index is out of range.
    #[error("record index {index} is out of range for {len} records")]
    OutOfRange {
        /// The requested index.
        index: i64,
        /// The number of records.
        len: u64,
    },
    /// A record cannot be appended because the dataset is at its maximum number of records.
    #[error("dataset {path} cannot grow beyond {maximum} records")]
    FixedSize {
        /// The dataset path.
        path: NodePath,
        /// The maximum number of records.
        maximum: u64,
    },
    /// Reading the dataset failed.
    #[error("failed to read dataset {path}: {source}")]
    ReadError {
        /// The dataset path.
        path: NodePath,
        /// The cause.
        source: RawIoError,
    },
    /// Writing the dataset failed.
    #[error("failed to write dataset {path}: {source}")]
    WriteError {
        /// The dataset path.
        path: NodePath,
        /// The cause.
        source: RawIoError,
    },
    /// An invalid node path.
    #[error(transparent)]
    InvalidPath(#[from] NodePathError),
    /// Invalid dataset metadata.
    #[error("invalid metadata for dataset {0}: {1}")]
    InvalidMetadata(NodePath, String),
    /// A dataspace error.
    #[error(transparent)]
    DataspaceError(#[from] DataspaceError),
    /// A hyperslab error.
    #[error(transparent)]
    HyperslabError(#[from] HyperslabError),
    /// The number of bytes does not match the memory dataspace.
    #[error("got {got} bytes, expected {expected} bytes")]
    InvalidBytesLength {
        /// The number of bytes.
        got: usize,
        /// The expected number of bytes.
        expected: usize,
    },
}

impl DatasetError {
    pub(crate) fn read(path: &NodePath, source: impl Into<RawIoError>) -> Self {
        Self::ReadError {
            path: path.clone(),
            source: source.into(),
        }
    }

    pub(crate) fn write(path: &NodePath, source: impl Into<RawIoError>) -> Self {
        Self::WriteError {
            path: path.clone(),
            source: source.into(),
        }
    }
}
