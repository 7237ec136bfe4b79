//! Unique datasets.
//!
//! A unique dataset holds exactly one instance of a [`DatasetValue`], with the shape of the value.
//! Writing overwrites the whole dataset in place, and reading resizes the output value if its type allows.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use zarrs_dataset::{group::Group, storage::store::MemoryStore};
//! # use zarrs_dataset::unique_dataset::{create_unique_dataset, read_unique_dataset_at, write_unique_dataset};
//! let root = Group::root(Arc::new(MemoryStore::new()));
//! let dataset = create_unique_dataset::<Vec<f64>, _>(&root, "group/values", &3)?;
//! write_unique_dataset(&dataset, &vec![1.0f64, 2.0, 3.0])?;
//!
//! let mut values = Vec::<f64>::new();
//! read_unique_dataset_at(&root, "group/values", &mut values)?;
//! assert_eq!(values, vec![1.0, 2.0, 3.0]);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use crate::{
    config::global_config,
    dataset::{
        DataType, Dataset, DatasetBuilder, DatasetError, DatasetMetadata, Dataspace, Element,
        GzipCompressionLevel, Hyperslab,
    },
    group::Group,
    node::NodePath,
    storage::{ReadableStorageTraits, ReadableWritableStorageTraits},
    value::DatasetValue,
};

/// Options for creating datasets with the typed interfaces.
///
/// The default options are read from the [global configuration](crate::config::Config).
#[derive(Clone, Debug)]
pub struct DatasetCreateOptions {
    compression_threshold: usize,
    compression_level: GzipCompressionLevel,
}

impl Default for DatasetCreateOptions {
    fn default() -> Self {
        let config = global_config();
        Self {
            compression_threshold: config.compression_threshold(),
            compression_level: config.compression_level(),
        }
    }
}

impl DatasetCreateOptions {
    /// Create dataset creation options.
    #[must_use]
    pub fn new(compression_threshold: usize, compression_level: GzipCompressionLevel) -> Self {
        Self {
            compression_threshold,
            compression_level,
        }
    }

    /// Get the size in bytes above which unique datasets are chunked and compressed.
    #[must_use]
    pub fn compression_threshold(&self) -> usize {
        self.compression_threshold
    }

    /// Set the size in bytes above which unique datasets are chunked and compressed.
    pub fn set_compression_threshold(&mut self, compression_threshold: usize) -> &mut Self {
        self.compression_threshold = compression_threshold;
        self
    }

    /// Get the gzip compression level.
    #[must_use]
    pub fn compression_level(&self) -> GzipCompressionLevel {
        self.compression_level
    }

    /// Set the gzip compression level.
    pub fn set_compression_level(&mut self, compression_level: GzipCompressionLevel) -> &mut Self {
        self.compression_level = compression_level;
        self
    }
}

/// Create a unique dataset for values of type `T` with `extents` at `name`, resolved relative to `location`.
///
/// Any existing node at the path is erased first, and missing intermediate groups are created.
/// The dataset is chunked and compressed if a value occupies more bytes than the compression threshold of the [default options](DatasetCreateOptions::default).
///
/// # Errors
/// Returns [`DatasetError::InvalidPath`] if `name` is not a valid path, or [`DatasetError::CreationError`] if the dataset cannot be created.
pub fn create_unique_dataset<T: DatasetValue, TStorage: ?Sized + ReadableWritableStorageTraits>(
    location: &Group<TStorage>,
    name: &str,
    extents: &T::Extents,
) -> Result<Dataset<TStorage>, DatasetError> {
    create_unique_dataset_opt::<T, TStorage>(location, name, extents, &DatasetCreateOptions::default())
}

/// Explicit options version of [`create_unique_dataset`].
#[allow(clippy::missing_errors_doc)]
pub fn create_unique_dataset_opt<
    T: DatasetValue,
    TStorage: ?Sized + ReadableWritableStorageTraits,
>(
    location: &Group<TStorage>,
    name: &str,
    extents: &T::Extents,
    options: &DatasetCreateOptions,
) -> Result<Dataset<TStorage>, DatasetError> {
    let path = location.resolve(name)?;
    let shape = T::shape_from_extents(extents);
    let data_type = T::Element::DATA_TYPE;
    let size = shape
        .iter()
        .try_fold(data_type.size(), |acc, &extent| {
            acc.checked_mul(usize::try_from(extent).ok()?)
        })
        .unwrap_or(usize::MAX);

    let mut builder = DatasetBuilder::new(data_type, Dataspace::new(shape.clone()));
    if !shape.is_empty() && size > options.compression_threshold {
        builder
            .chunk_shape(shape.iter().map(|&extent| extent.max(1)).collect())
            .compression(Some(options.compression_level));
    }
    builder.replace(location.storage().clone(), &path)
}

/// Write `value` to the unique `dataset`.
///
/// # Errors
/// Returns [`DatasetError::ShapeMismatch`] if the shape of `value` differs from the dataset shape,
/// [`DatasetError::IncompatibleDataType`] if the element type differs from the dataset data type,
/// or [`DatasetError::WriteError`] if the write fails.
pub fn write_unique_dataset<T: DatasetValue, TStorage: ?Sized + ReadableWritableStorageTraits>(
    dataset: &Dataset<TStorage>,
    value: &T,
) -> Result<(), DatasetError> {
    let metadata = dataset.metadata()?;
    validate_data_type::<T>(dataset.path(), &metadata)?;
    let shape = value.shape();
    if shape != metadata.shape {
        return Err(DatasetError::ShapeMismatch {
            path: dataset.path().clone(),
            expected: format!("shape {shape:?}"),
            actual: metadata.shape,
        });
    }
    let memory_space = Dataspace::new(shape);
    let bytes = T::Element::to_bytes(&value.elements());
    dataset.store_hyperslab(&Hyperslab::new_all(&memory_space), &memory_space, &bytes)
}

/// Read the unique `dataset` into `out`.
///
/// `out` is resized to the dataset shape if its type allows, otherwise the dataset shape must match the shape of its type.
/// `out` is unchanged on error.
///
/// # Errors
/// Returns [`DatasetError::ShapeMismatch`] if the dataset shape cannot be held by `T`,
/// [`DatasetError::IncompatibleDataType`] if the element type differs from the dataset data type,
/// or [`DatasetError::ReadError`] if the read fails.
pub fn read_unique_dataset<T: DatasetValue, TStorage: ?Sized + ReadableStorageTraits>(
    dataset: &Dataset<TStorage>,
    out: &mut T,
) -> Result<(), DatasetError> {
    let metadata = dataset.metadata()?;
    validate_data_type::<T>(dataset.path(), &metadata)?;
    if !T::is_compatible_shape(&metadata.shape) {
        return Err(shape_mismatch::<T>(dataset.path(), metadata.shape));
    }
    let memory_space = Dataspace::new(metadata.shape.clone());
    let bytes = dataset.retrieve_hyperslab(&Hyperslab::new_all(&memory_space), &memory_space)?;
    let elements =
        T::Element::from_bytes(&bytes).map_err(|err| DatasetError::read(dataset.path(), err))?;
    out.assign_elements(&metadata.shape, elements)
        .map_err(|_| shape_mismatch::<T>(dataset.path(), metadata.shape))
}

/// Create a unique dataset at `name` (resolved relative to `location`) with the shape of `value`, and write `value` to it.
///
/// # Errors
/// See [`create_unique_dataset`] and [`write_unique_dataset`].
pub fn write_unique_dataset_at<
    T: DatasetValue,
    TStorage: ?Sized + ReadableWritableStorageTraits,
>(
    location: &Group<TStorage>,
    name: &str,
    value: &T,
) -> Result<Dataset<TStorage>, DatasetError> {
    let dataset = create_unique_dataset::<T, TStorage>(location, name, &value.extents())?;
    write_unique_dataset(&dataset, value)?;
    Ok(dataset)
}

/// Read the existing unique dataset at `name` (resolved relative to `location`) into `out`.
///
/// # Errors
/// Returns [`DatasetError::NotFound`] if there is no dataset at the path, otherwise see [`read_unique_dataset`].
pub fn read_unique_dataset_at<T: DatasetValue, TStorage: ?Sized + ReadableStorageTraits>(
    location: &Group<TStorage>,
    name: &str,
    out: &mut T,
) -> Result<(), DatasetError> {
    read_unique_dataset(&location.open_dataset(name)?, out)
}

pub(crate) fn validate_data_type<T: DatasetValue>(
    path: &NodePath,
    metadata: &DatasetMetadata,
) -> Result<(), DatasetError> {
    let expected: DataType = T::Element::DATA_TYPE;
    if metadata.data_type == expected {
        Ok(())
    } else {
        Err(DatasetError::IncompatibleDataType {
            path: path.clone(),
            expected,
            actual: metadata.data_type,
        })
    }
}

pub(crate) fn shape_mismatch<T: DatasetValue>(path: &NodePath, actual: Vec<u64>) -> DatasetError {
    DatasetError::ShapeMismatch {
        path: path.clone(),
        expected: format!("a {} of rank {}", T::CATEGORY, T::RANK),
        actual,
    }
}
