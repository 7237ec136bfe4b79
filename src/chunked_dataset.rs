//! Chunked record datasets.
//!
//! A record dataset holds a sequence of records, each an instance of a [`DatasetValue`] with the same shape.
//! The dataset shape is `[record_count, record_shape...]` and every record is stored in its own compressed chunk of shape `[1, record_shape...]`.
//! Only the record axis can change, and it grows by one on each append up to the [`RecordCapacity`].
//!
//! ```rust
//! # use std::sync::Arc;
//! # use zarrs_dataset::{group::Group, storage::store::MemoryStore};
//! # use zarrs_dataset::chunked_dataset::{append_record, create_chunked_dataset, read_record, RecordCapacity};
//! let root = Group::root(Arc::new(MemoryStore::new()));
//! let dataset = create_chunked_dataset::<[f32; 3], _>(&root, "positions", &(), RecordCapacity::Unlimited)?;
//! append_record(&dataset, &[0.0f32, 1.0, 2.0])?;
//! append_record(&dataset, &[3.0f32, 4.0, 5.0])?;
//!
//! let mut position = [0.0f32; 3];
//! assert_eq!(read_record(&dataset, &mut position, -1)?, 1);
//! assert_eq!(position, [3.0, 4.0, 5.0]);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use crate::{
    dataset::{
        Dataset, DatasetBuilder, DatasetError, DatasetMetadata, Dataspace, Element, Hyperslab,
        MaximumExtent,
    },
    group::Group,
    node::NodePath,
    storage::{ReadableStorageTraits, ReadableWritableStorageTraits},
    unique_dataset::{shape_mismatch, validate_data_type, DatasetCreateOptions},
    value::DatasetValue,
};

/// The record capacity of a record dataset.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RecordCapacity {
    /// Starts empty and grows without bound.
    #[default]
    Unlimited,
    /// Starts empty and grows up to the given number of records.
    Bounded(u64),
    /// Starts with the given number of zeroed records and cannot grow. Records are written by index.
    Preallocated(u64),
}

impl RecordCapacity {
    fn initial_records(self) -> u64 {
        match self {
            Self::Unlimited | Self::Bounded(_) => 0,
            Self::Preallocated(records) => records,
        }
    }

    fn maximum_records(self) -> MaximumExtent {
        match self {
            Self::Unlimited => MaximumExtent::Unlimited,
            Self::Bounded(records) | Self::Preallocated(records) => MaximumExtent::Finite(records),
        }
    }
}

/// The slot written by [`write_record`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RecordIndex {
    /// Append a new record.
    #[default]
    Append,
    /// Overwrite the existing record at an index.
    At(u64),
}

impl From<u64> for RecordIndex {
    fn from(index: u64) -> Self {
        Self::At(index)
    }
}

/// Create a record dataset for records of type `T` with `extents` at `name`, resolved relative to `location`.
///
/// Any existing node at the path is erased first, and missing intermediate groups are created.
/// Records are compressed with the compression level of the [default options](DatasetCreateOptions::default).
///
/// # Errors
/// Returns [`DatasetError::InvalidPath`] if `name` is not a valid path, or [`DatasetError::CreationError`] if the dataset cannot be created.
pub fn create_chunked_dataset<T: DatasetValue, TStorage: ?Sized + ReadableWritableStorageTraits>(
    location: &Group<TStorage>,
    name: &str,
    extents: &T::Extents,
    capacity: RecordCapacity,
) -> Result<Dataset<TStorage>, DatasetError> {
    create_chunked_dataset_opt::<T, TStorage>(
        location,
        name,
        extents,
        capacity,
        &DatasetCreateOptions::default(),
    )
}

/// Explicit options version of [`create_chunked_dataset`].
#[allow(clippy::missing_errors_doc)]
pub fn create_chunked_dataset_opt<
    T: DatasetValue,
    TStorage: ?Sized + ReadableWritableStorageTraits,
>(
    location: &Group<TStorage>,
    name: &str,
    extents: &T::Extents,
    capacity: RecordCapacity,
    options: &DatasetCreateOptions,
) -> Result<Dataset<TStorage>, DatasetError> {
    let path = location.resolve(name)?;
    let record_shape = T::shape_from_extents(extents);

    let shape = std::iter::once(capacity.initial_records())
        .chain(record_shape.iter().copied())
        .collect();
    let maximum_shape = std::iter::once(capacity.maximum_records())
        .chain(record_shape.iter().copied().map(MaximumExtent::Finite))
        .collect();
    let chunk_shape = std::iter::once(1)
        .chain(record_shape.iter().map(|&extent| extent.max(1)))
        .collect();
    let dataspace = Dataspace::new_with_maximum(shape, maximum_shape)
        .map_err(|err| DatasetError::CreationError(path.clone(), err.to_string()))?;

    DatasetBuilder::new(T::Element::DATA_TYPE, dataspace)
        .chunk_shape(chunk_shape)
        .compression(Some(options.compression_level()))
        .replace(location.storage().clone(), &path)
}

/// Append `value` as a new record, returning its index.
///
/// # Errors
/// See [`write_record`].
pub fn append_record<T: DatasetValue, TStorage: ?Sized + ReadableWritableStorageTraits>(
    dataset: &Dataset<TStorage>,
    value: &T,
) -> Result<u64, DatasetError> {
    write_record(dataset, value, RecordIndex::Append)
}

/// Write `value` as the record at `index`, returning the index of the written record.
///
/// [`RecordIndex::Append`] grows the dataset by one record and writes to the new record.
/// [`RecordIndex::At`] overwrites an existing record.
///
/// # Errors
/// Returns [`DatasetError::ShapeMismatch`] if the shape of `value` is not the record shape,
/// [`DatasetError::IncompatibleDataType`] if the element type differs from the dataset data type,
/// [`DatasetError::FixedSize`] if appending would exceed the maximum number of records,
/// [`DatasetError::OutOfRange`] if an index is not less than the number of records,
/// or [`DatasetError::WriteError`] if the write fails.
pub fn write_record<T: DatasetValue, TStorage: ?Sized + ReadableWritableStorageTraits>(
    dataset: &Dataset<TStorage>,
    value: &T,
    index: RecordIndex,
) -> Result<u64, DatasetError> {
    let metadata = dataset.metadata()?;
    validate_data_type::<T>(dataset.path(), &metadata)?;
    let record_shape = value.shape();
    let Some((&len, dataset_record_shape)) = metadata.shape.split_first() else {
        return Err(shape_mismatch::<T>(dataset.path(), metadata.shape.clone()));
    };
    if dataset_record_shape != record_shape.as_slice() {
        return Err(DatasetError::ShapeMismatch {
            path: dataset.path().clone(),
            expected: format!("records of shape {record_shape:?}"),
            actual: metadata.shape,
        });
    }

    let index = match index {
        RecordIndex::Append => {
            let maximum = metadata.dataspace.maximum_shape[0];
            if !maximum.allows(len + 1) {
                return Err(DatasetError::FixedSize {
                    path: dataset.path().clone(),
                    maximum: len,
                });
            }
            let mut shape = metadata.shape.clone();
            shape[0] = len + 1;
            dataset.set_extent(&shape)?;
            len
        }
        RecordIndex::At(index) if index < len => index,
        RecordIndex::At(index) => {
            return Err(DatasetError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            })
        }
    };

    let memory_space = Dataspace::new(record_shape);
    let bytes = T::Element::to_bytes(&value.elements());
    dataset.store_hyperslab(&record_selection(index, &memory_space)?, &memory_space, &bytes)?;
    Ok(index)
}

/// Read the record at `index` into `out`, returning the resolved index.
///
/// A negative `index` counts from the end, so `-1` is the last record.
/// `out` is resized to the record shape if its type allows, and is unchanged on error.
///
/// # Errors
/// Returns [`DatasetError::OutOfRange`] if `index` is outside `[-len, len)`,
/// [`DatasetError::ShapeMismatch`] if the record shape cannot be held by `T`,
/// [`DatasetError::IncompatibleDataType`] if the element type differs from the dataset data type,
/// or [`DatasetError::ReadError`] if the read fails.
pub fn read_record<T: DatasetValue, TStorage: ?Sized + ReadableStorageTraits>(
    dataset: &Dataset<TStorage>,
    out: &mut T,
    index: i64,
) -> Result<u64, DatasetError> {
    let metadata = dataset.metadata()?;
    validate_data_type::<T>(dataset.path(), &metadata)?;
    let (len, record_shape) = split_record_shape::<T>(dataset.path(), &metadata)?;
    let index = resolve_record_index(index, len)?;

    let memory_space = Dataspace::new(record_shape.clone());
    let bytes = dataset.retrieve_hyperslab(&record_selection(index, &memory_space)?, &memory_space)?;
    let elements =
        T::Element::from_bytes(&bytes).map_err(|err| DatasetError::read(dataset.path(), err))?;
    out.assign_elements(&record_shape, elements)
        .map_err(|_| shape_mismatch::<T>(dataset.path(), metadata.shape))?;
    Ok(index)
}

/// Returns the number of records in a record dataset.
///
/// # Errors
/// Returns [`DatasetError::ShapeMismatch`] if the dataset has rank zero, or an error if the metadata cannot be read.
pub fn record_count<TStorage: ?Sized + ReadableStorageTraits>(
    dataset: &Dataset<TStorage>,
) -> Result<u64, DatasetError> {
    let metadata = dataset.metadata()?;
    match metadata.shape.first() {
        Some(&len) => Ok(len),
        None => Err(record_rank_mismatch(dataset, metadata)),
    }
}

/// Returns the shape of each record in a record dataset.
///
/// # Errors
/// Returns [`DatasetError::ShapeMismatch`] if the dataset has rank zero, or an error if the metadata cannot be read.
pub fn record_shape<TStorage: ?Sized + ReadableStorageTraits>(
    dataset: &Dataset<TStorage>,
) -> Result<Vec<u64>, DatasetError> {
    let metadata = dataset.metadata()?;
    match metadata.shape.split_first() {
        Some((_, record_shape)) => Ok(record_shape.to_vec()),
        None => Err(record_rank_mismatch(dataset, metadata)),
    }
}

/// Resolve a record `index` for a dataset with `len` records.
///
/// A non-negative `index` must be less than `len`. A negative `index` must be at least `-len`, and resolves to `len + index`.
///
/// # Errors
/// Returns [`DatasetError::OutOfRange`] if `index` is outside `[-len, len)`.
pub fn resolve_record_index(index: i64, len: u64) -> Result<u64, DatasetError> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs()).filter(|&index| index < len)
    };
    resolved.ok_or(DatasetError::OutOfRange { index, len })
}

fn split_record_shape<T: DatasetValue>(
    path: &NodePath,
    metadata: &DatasetMetadata,
) -> Result<(u64, Vec<u64>), DatasetError> {
    match metadata.shape.split_first() {
        Some((&len, record_shape)) if T::is_compatible_shape(record_shape) => {
            Ok((len, record_shape.to_vec()))
        }
        _ => Err(shape_mismatch::<T>(path, metadata.shape.clone())),
    }
}

fn record_rank_mismatch<TStorage: ?Sized>(
    dataset: &Dataset<TStorage>,
    metadata: DatasetMetadata,
) -> DatasetError {
    DatasetError::ShapeMismatch {
        path: dataset.path().clone(),
        expected: "a record axis".to_string(),
        actual: metadata.shape,
    }
}

/// Select the record at `index` with `record_space` as a block of shape `[1, record_shape...]`.
fn record_selection(index: u64, record_space: &Dataspace) -> Result<Hyperslab, DatasetError> {
    let offset = std::iter::once(index)
        .chain(std::iter::repeat(0).take(record_space.rank()))
        .collect();
    let block = std::iter::once(1)
        .chain(record_space.shape().iter().copied())
        .collect();
    Ok(Hyperslab::new_block(offset, block)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        dataset::GzipCompressionLevel,
        storage::{data_key, store::MemoryStore, ReadableStorageTraits},
    };

    use super::*;

    #[test]
    fn record_index_resolution() {
        assert_eq!(resolve_record_index(0, 3).unwrap(), 0);
        assert_eq!(resolve_record_index(2, 3).unwrap(), 2);
        assert_eq!(resolve_record_index(-1, 3).unwrap(), 2);
        assert_eq!(resolve_record_index(-3, 3).unwrap(), 0);
        assert!(matches!(
            resolve_record_index(3, 3),
            Err(DatasetError::OutOfRange { index: 3, len: 3 })
        ));
        assert!(resolve_record_index(-4, 3).is_err());
        assert!(resolve_record_index(0, 0).is_err());
        assert!(resolve_record_index(-1, 0).is_err());
        assert!(resolve_record_index(i64::MIN, u64::MAX).is_ok());
    }

    #[test]
    fn record_layout() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let root = Group::root(store.clone());
        let dataset = create_chunked_dataset_opt::<Vec<[u16; 2]>, _>(
            &root,
            "records",
            &0,
            RecordCapacity::Unlimited,
            &DatasetCreateOptions::new(64, GzipCompressionLevel::try_from(1)?),
        )?;
        let metadata = dataset.metadata()?;
        assert_eq!(metadata.shape, vec![0, 0, 2]);
        assert_eq!(metadata.chunk_shape(), &[1, 1, 2]);
        assert!(metadata.codec_chain()?.is_compressed());
        assert_eq!(record_count(&dataset)?, 0);
        assert_eq!(record_shape(&dataset)?, vec![0, 2]);

        let scalar = create_unique_dataset_helper(&root)?;
        assert!(matches!(
            record_count(&scalar),
            Err(DatasetError::ShapeMismatch { .. })
        ));

        assert_eq!(append_record(&dataset, &Vec::<[u16; 2]>::new())?, 0);
        assert!(store.get(&data_key(dataset.path(), &[0, 0, 0]))?.is_none());
        assert!(matches!(
            append_record(&dataset, &vec![[1u16, 2]]),
            Err(DatasetError::ShapeMismatch { .. })
        ));
        Ok(())
    }

    fn create_unique_dataset_helper(
        root: &Group<MemoryStore>,
    ) -> Result<Dataset<MemoryStore>, DatasetError> {
        crate::unique_dataset::write_unique_dataset_at(root, "scalar", &1u8)
    }

    #[test]
    fn record_read_shape_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let root = Group::root(Arc::new(MemoryStore::new()));
        let dataset =
            create_chunked_dataset::<[f32; 3], _>(&root, "positions", &(), RecordCapacity::Unlimited)?;
        append_record(&dataset, &[1.0f32, 2.0, 3.0])?;

        let mut short = [0.0f32; 2];
        assert!(matches!(
            read_record(&dataset, &mut short, 0),
            Err(DatasetError::ShapeMismatch { .. })
        ));
        assert_eq!(short, [0.0; 2]);

        let mut resized = Vec::<f32>::new();
        assert_eq!(read_record(&dataset, &mut resized, -1)?, 0);
        assert_eq!(resized, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn record_write_at() -> Result<(), Box<dyn std::error::Error>> {
        let root = Group::root(Arc::new(MemoryStore::new()));
        let dataset =
            create_chunked_dataset::<i64, _>(&root, "counts", &(), RecordCapacity::Preallocated(3))?;
        assert_eq!(record_count(&dataset)?, 3);
        let mut value = -1i64;
        assert_eq!(read_record(&dataset, &mut value, 2)?, 2);
        assert_eq!(value, 0);

        assert_eq!(write_record(&dataset, &7i64, RecordIndex::At(1))?, 1);
        assert_eq!(write_record(&dataset, &9i64, 2u64.into())?, 2);
        assert!(matches!(
            write_record(&dataset, &1i64, RecordIndex::At(3)),
            Err(DatasetError::OutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            append_record(&dataset, &1i64),
            Err(DatasetError::FixedSize { maximum: 3, .. })
        ));

        let values = (0..3)
            .map(|index| {
                let mut value = 0i64;
                read_record(&dataset, &mut value, index).map(|_| value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(values, vec![0, 7, 9]);
        Ok(())
    }
}
