//! Datasets.
//!
//! A dataset is a node in a hierarchy holding a typed, multidimensional array of elements.
//! Its metadata (see [`DatasetMetadata`]) records the [`DataType`], the current and maximum shape ([`Dataspace`]), the [`DatasetLayout`], and the chunk codecs.
//!
//! Datasets are created with a [`DatasetBuilder`] and accessed through a [`Dataset`] handle.
//! The handle holds no state other than its storage and path, so every operation reads the current metadata from the store.
//! Elements are read and written by [`Hyperslab`] selections as native endian bytes.
//!
//! The typed interfaces in [`unique_dataset`](crate::unique_dataset) and [`chunked_dataset`](crate::chunked_dataset) are built on these operations.

pub mod codec;
mod data_type;
mod dataset_builder;
mod dataset_errors;
mod dataset_metadata;
mod dataspace;
mod element;
mod hyperslab;

use std::{
    collections::BTreeMap,
    sync::Arc,
};

use itertools::Itertools;

pub use self::{
    codec::GzipCompressionLevel,
    data_type::{DataType, Endianness, NATIVE_ENDIAN},
    dataset_builder::DatasetBuilder,
    dataset_errors::{DatasetError, RawIoError},
    dataset_metadata::{
        ChunkGridMetadata, ChunkKeyEncodingMetadata, ChunkKeySeparator, DataspaceMetadata,
        DatasetLayout, DatasetMetadata, DefaultChunkKeyEncodingConfiguration,
        RegularChunkGridConfiguration,
    },
    dataspace::{Dataspace, DataspaceError, MaximumExtent},
    element::{Element, ElementError},
    hyperslab::{Hyperslab, HyperslabError},
};

use crate::{
    node::{NodeMetadata, NodePath},
    storage::{
        erase_chunk, retrieve_chunk, retrieve_metadata, store_chunk, store_metadata,
        ReadableStorageTraits, ReadableWritableStorageTraits, StorageError,
    },
};

use self::codec::CodecChain;

/// A dataset handle.
#[derive(Debug)]
pub struct Dataset<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    path: NodePath,
}

impl<TStorage: ?Sized> Clone for Dataset<TStorage> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            path: self.path.clone(),
        }
    }
}

impl<TStorage: ?Sized> Dataset<TStorage> {
    pub(crate) fn new(storage: Arc<TStorage>, path: NodePath) -> Self {
        Self { storage, path }
    }

    /// Get the path of the dataset.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<TStorage> {
        &self.storage
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Dataset<TStorage> {
    /// Open the existing dataset in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`DatasetError::NotFound`] if there is no dataset at `path`, or another [`DatasetError`] if the path or metadata is invalid.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, DatasetError> {
        Self::open_path(storage, NodePath::new(path)?)
    }

    /// Open the existing dataset in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`DatasetError::NotFound`] if there is no dataset at `path`, or another [`DatasetError`] if the metadata is invalid.
    pub fn open_path(storage: Arc<TStorage>, path: NodePath) -> Result<Self, DatasetError> {
        let dataset = Self::new(storage, path);
        dataset.metadata()?;
        Ok(dataset)
    }

    /// Read the current metadata of the dataset.
    ///
    /// # Errors
    /// Returns [`DatasetError::NotFound`] if the dataset no longer exists, [`DatasetError::InvalidMetadata`] if its metadata is invalid, or [`DatasetError::ReadError`] on a storage error.
    pub fn metadata(&self) -> Result<DatasetMetadata, DatasetError> {
        match retrieve_metadata(&*self.storage, &self.path) {
            Ok(Some(NodeMetadata::Dataset(metadata))) => {
                metadata
                    .validate()
                    .map_err(|err| DatasetError::InvalidMetadata(self.path.clone(), err))?;
                Ok(metadata)
            }
            Ok(Some(NodeMetadata::Group(_)) | None) => Err(DatasetError::NotFound(self.path.clone())),
            Err(StorageError::InvalidMetadata(_, err)) => {
                Err(DatasetError::InvalidMetadata(self.path.clone(), err))
            }
            Err(err) => Err(DatasetError::read(&self.path, err)),
        }
    }

    /// Read the current dataspace of the dataset.
    ///
    /// # Errors
    /// See [`metadata`](Dataset::metadata).
    pub fn dataspace(&self) -> Result<Dataspace, DatasetError> {
        Ok(self.metadata()?.dataspace()?)
    }

    /// Read the data type of the dataset.
    ///
    /// # Errors
    /// See [`metadata`](Dataset::metadata).
    pub fn data_type(&self) -> Result<DataType, DatasetError> {
        Ok(self.metadata()?.data_type)
    }

    /// Read the layout of the dataset.
    ///
    /// # Errors
    /// See [`metadata`](Dataset::metadata).
    pub fn layout(&self) -> Result<DatasetLayout, DatasetError> {
        Ok(self.metadata()?.layout())
    }

    /// Read the elements of the dataset within `selection` as native endian bytes.
    ///
    /// Elements are returned in row-major order of the selection, and `memory_space` must hold as many elements as the selection.
    /// Elements in chunks that have not been written read as zero.
    ///
    /// # Errors
    /// Returns [`DatasetError::HyperslabError`] if the selection is not valid for the dataset or the memory dataspace, or [`DatasetError::ReadError`] if a chunk cannot be retrieved or decoded.
    pub fn retrieve_hyperslab(
        &self,
        selection: &Hyperslab,
        memory_space: &Dataspace,
    ) -> Result<Vec<u8>, DatasetError> {
        let metadata = self.metadata()?;
        validate_selection(selection, memory_space, &metadata.dataspace()?)?;
        let codec_chain = self.codec_chain(&metadata)?;
        let element_size = metadata.data_type.size();
        let chunk_shape = metadata.chunk_shape();
        let chunk_size = metadata.chunk_size();

        let mut chunks = BTreeMap::new();
        for chunk_indices in selected_chunks(selection, chunk_shape).into_keys() {
            let chunk = match retrieve_chunk(&*self.storage, &self.path, &chunk_indices)
                .map_err(|err| DatasetError::read(&self.path, err))?
            {
                Some(encoded) => codec_chain
                    .decode(&encoded, chunk_size)
                    .map_err(|err| DatasetError::read(&self.path, err))?,
                None => vec![0; chunk_size],
            };
            chunks.insert(chunk_indices, chunk);
        }

        let mut bytes = Vec::with_capacity(selection_size(selection, element_size));
        let mut chunk_indices = Vec::with_capacity(selection.rank());
        selection.for_each_coordinate(|coordinate| {
            let offset = chunk_location(coordinate, chunk_shape, &mut chunk_indices) * element_size;
            if let Some(chunk) = chunks.get(&chunk_indices) {
                bytes.extend_from_slice(&chunk[offset..offset + element_size]);
            }
        });
        Ok(bytes)
    }

    fn codec_chain(&self, metadata: &DatasetMetadata) -> Result<CodecChain, DatasetError> {
        metadata
            .codec_chain()
            .map_err(|err| DatasetError::InvalidMetadata(self.path.clone(), err.to_string()))
    }
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Dataset<TStorage> {
    /// Write native endian element `bytes` to the dataset within `selection`.
    ///
    /// `bytes` holds the elements of `memory_space` in row-major order, which map onto the selected elements in row-major order.
    /// Chunks only partially covered by the selection are read, updated, and written back.
    ///
    /// # Errors
    /// Returns [`DatasetError::HyperslabError`] if the selection is not valid for the dataset or the memory dataspace,
    /// [`DatasetError::InvalidBytesLength`] if `bytes` does not match the memory dataspace,
    /// or [`DatasetError::WriteError`] if a chunk cannot be read, encoded, or stored.
    pub fn store_hyperslab(
        &self,
        selection: &Hyperslab,
        memory_space: &Dataspace,
        bytes: &[u8],
    ) -> Result<(), DatasetError> {
        let metadata = self.metadata()?;
        validate_selection(selection, memory_space, &metadata.dataspace()?)?;
        let element_size = metadata.data_type.size();
        let expected = selection_size(selection, element_size);
        if bytes.len() != expected {
            return Err(DatasetError::InvalidBytesLength {
                got: bytes.len(),
                expected,
            });
        }
        let codec_chain = self.codec_chain(&metadata)?;
        let chunk_shape = metadata.chunk_shape();
        let chunk_size = metadata.chunk_size();
        let chunk_elements = (chunk_size / element_size) as u64;

        let mut chunks = BTreeMap::new();
        for (chunk_indices, num_selected) in selected_chunks(selection, chunk_shape) {
            let existing = if num_selected == chunk_elements {
                None
            } else {
                retrieve_chunk(&*self.storage, &self.path, &chunk_indices)
                    .map_err(|err| DatasetError::write(&self.path, err))?
            };
            let chunk = match existing {
                Some(encoded) => codec_chain
                    .decode(&encoded, chunk_size)
                    .map_err(|err| DatasetError::write(&self.path, err))?,
                None => vec![0; chunk_size],
            };
            chunks.insert(chunk_indices, chunk);
        }

        let mut elements = bytes.chunks_exact(element_size);
        let mut chunk_indices = Vec::with_capacity(selection.rank());
        selection.for_each_coordinate(|coordinate| {
            let offset = chunk_location(coordinate, chunk_shape, &mut chunk_indices) * element_size;
            if let (Some(chunk), Some(element)) = (chunks.get_mut(&chunk_indices), elements.next()) {
                chunk[offset..offset + element_size].copy_from_slice(element);
            }
        });

        for (chunk_indices, chunk) in chunks {
            let encoded = codec_chain
                .encode(chunk)
                .map_err(|err| DatasetError::write(&self.path, err))?;
            store_chunk(&*self.storage, &self.path, &chunk_indices, encoded.into())
                .map_err(|err| DatasetError::write(&self.path, err))?;
        }
        Ok(())
    }

    /// Set the current shape of the dataset.
    ///
    /// Chunks entirely outside of a reduced shape are erased, and elements outside of it in the remaining chunks are reset to zero.
    /// Elements beyond a shrunk extent therefore read as zero if the extent grows again.
    ///
    /// # Errors
    /// Returns [`DatasetError::DataspaceError`] if the dataset is contiguous, the rank differs, or `shape` exceeds the maximum shape.
    /// Returns [`DatasetError::WriteError`] if the store cannot be updated.
    pub fn set_extent(&self, shape: &[u64]) -> Result<(), DatasetError> {
        let mut metadata = self.metadata()?;
        if metadata.layout() == DatasetLayout::Contiguous {
            return Err(DataspaceError::NotExtendible.into());
        }
        let mut dataspace = metadata.dataspace()?;
        dataspace.set_extent(shape)?;

        if metadata.shape.iter().zip(shape).any(|(old, new)| new < old) {
            self.truncate_chunks(&metadata, shape)?;
        }

        metadata.shape = shape.to_vec();
        store_metadata(&*self.storage, &self.path, &metadata.into())
            .map_err(|err| DatasetError::write(&self.path, err))
    }

    /// Erase chunks entirely outside of `shape`, and zero the elements outside of `shape` in chunks it partially covers.
    fn truncate_chunks(&self, metadata: &DatasetMetadata, shape: &[u64]) -> Result<(), DatasetError> {
        let chunk_shape = metadata.chunk_shape();
        let chunk_grid = metadata
            .shape
            .iter()
            .zip(chunk_shape)
            .map(|(&extent, &chunk)| 0..extent.div_ceil(chunk))
            .multi_cartesian_product();
        let codec_chain = self.codec_chain(metadata)?;
        let element_size = metadata.data_type.size();
        for chunk_indices in chunk_grid {
            let outside = chunk_indices
                .iter()
                .zip(chunk_shape)
                .zip(shape)
                .any(|((&index, &chunk), &extent)| index * chunk >= extent);
            if outside {
                erase_chunk(&*self.storage, &self.path, &chunk_indices)
                    .map_err(|err| DatasetError::write(&self.path, err))?;
                continue;
            }
            let truncated = chunk_indices
                .iter()
                .zip(chunk_shape)
                .zip(shape)
                .any(|((&index, &chunk), &extent)| (index + 1) * chunk > extent);
            if !truncated {
                continue;
            }
            let Some(encoded) = retrieve_chunk(&*self.storage, &self.path, &chunk_indices)
                .map_err(|err| DatasetError::write(&self.path, err))?
            else {
                continue;
            };
            let mut chunk = codec_chain
                .decode(&encoded, metadata.chunk_size())
                .map_err(|err| DatasetError::write(&self.path, err))?;
            let local_indices = chunk_shape.iter().map(|&chunk| 0..chunk).multi_cartesian_product();
            for (element, local) in chunk.chunks_exact_mut(element_size).zip(local_indices) {
                let beyond = local
                    .iter()
                    .zip(&chunk_indices)
                    .zip(chunk_shape.iter().zip(shape))
                    .any(|((&local, &index), (&chunk, &extent))| index * chunk + local >= extent);
                if beyond {
                    element.fill(0);
                }
            }
            let encoded = codec_chain
                .encode(chunk)
                .map_err(|err| DatasetError::write(&self.path, err))?;
            store_chunk(&*self.storage, &self.path, &chunk_indices, encoded.into())
                .map_err(|err| DatasetError::write(&self.path, err))?;
        }
        Ok(())
    }
}

fn validate_selection(
    selection: &Hyperslab,
    memory_space: &Dataspace,
    dataspace: &Dataspace,
) -> Result<(), HyperslabError> {
    selection.validate(dataspace)?;
    if selection.num_elements() == memory_space.num_elements() {
        Ok(())
    } else {
        Err(HyperslabError::MemorySpaceMismatch {
            selected: selection.num_elements(),
            memory: memory_space.num_elements(),
        })
    }
}

fn selection_size(selection: &Hyperslab, element_size: usize) -> usize {
    usize::try_from(selection.num_elements()).unwrap_or(usize::MAX) * element_size
}

/// The chunk grid indices of `coordinate`, and its element offset within the chunk.
fn chunk_location(coordinate: &[u64], chunk_shape: &[u64], chunk_indices: &mut Vec<u64>) -> usize {
    chunk_indices.clear();
    let mut offset = 0;
    for (&index, &chunk) in coordinate.iter().zip(chunk_shape) {
        chunk_indices.push(index / chunk);
        offset = offset * chunk + index % chunk;
    }
    usize::try_from(offset).unwrap_or(usize::MAX)
}

/// The chunks intersecting `selection` and the number of selected elements in each.
fn selected_chunks(selection: &Hyperslab, chunk_shape: &[u64]) -> BTreeMap<Vec<u64>, u64> {
    let mut chunks = BTreeMap::<Vec<u64>, u64>::new();
    let mut chunk_indices = Vec::with_capacity(selection.rank());
    selection.for_each_coordinate(|coordinate| {
        chunk_location(coordinate, chunk_shape, &mut chunk_indices);
        if let Some(num_selected) = chunks.get_mut(&chunk_indices) {
            *num_selected += 1;
        } else {
            chunks.insert(chunk_indices.clone(), 1);
        }
    });
    chunks
}

#[cfg(test)]
mod tests {
    use crate::storage::{
        data_key, store::MemoryStore, ListableStorageTraits, ReadableStorageTraits,
    };

    use super::*;

    fn chunked_dataset(
        store: &Arc<MemoryStore>,
    ) -> Result<Dataset<MemoryStore>, Box<dyn std::error::Error>> {
        let dataspace = Dataspace::new_with_maximum(
            vec![4, 4],
            vec![MaximumExtent::Unlimited, MaximumExtent::Finite(4)],
        )?;
        Ok(DatasetBuilder::new(DataType::UInt16, dataspace)
            .chunk_shape(vec![2, 2])
            .compression(Some(GzipCompressionLevel::DEFAULT))
            .create(store.clone(), &NodePath::new("/data")?)?)
    }

    #[test]
    fn dataset_hyperslab_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let dataset = chunked_dataset(&store)?;
        let all = Hyperslab::new_all(&dataset.dataspace()?);
        let zeros = dataset.retrieve_hyperslab(&all, &Dataspace::new(vec![16]))?;
        assert_eq!(zeros, vec![0; 32]);

        // rows 1 and 2, columns 1 and 2: intersects all four chunks
        let selection = Hyperslab::new_block(vec![1, 1], vec![2, 2])?;
        let values: Vec<u16> = vec![1, 2, 3, 4];
        dataset.store_hyperslab(&selection, &Dataspace::new(vec![2, 2]), &u16::to_bytes(&values))?;
        assert_eq!(store.list_prefix(&"data/c/".try_into()?)?.len(), 4);

        let bytes = dataset.retrieve_hyperslab(&all, &Dataspace::new(vec![4, 4]))?;
        assert_eq!(
            u16::from_bytes(&bytes)?,
            vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0, 0, 0, 0, 0]
        );

        let strided = Hyperslab::new(vec![1, 1], vec![1, 2], vec![2, 1], vec![1, 1])?;
        let bytes = dataset.retrieve_hyperslab(&strided, &Dataspace::new(vec![2]))?;
        assert_eq!(u16::from_bytes(&bytes)?, vec![1, 3]);
        Ok(())
    }

    #[test]
    fn dataset_selected_chunks() -> Result<(), Box<dyn std::error::Error>> {
        let selection = Hyperslab::new_block(vec![1, 1], vec![2, 2])?;
        let chunks = selected_chunks(&selection, &[2, 2]);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.values().all(|&num_selected| num_selected == 1));

        let selection = Hyperslab::new_block(vec![0, 0], vec![4, 3])?;
        let chunks = selected_chunks(&selection, &[2, 2]);
        assert_eq!(
            chunks.into_iter().collect::<Vec<_>>(),
            vec![
                (vec![0, 0], 4),
                (vec![0, 1], 2),
                (vec![1, 0], 4),
                (vec![1, 1], 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn dataset_hyperslab_invalid() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let dataset = chunked_dataset(&store)?;
        let selection = Hyperslab::new_block(vec![3, 0], vec![2, 1])?;
        assert!(matches!(
            dataset.retrieve_hyperslab(&selection, &Dataspace::new(vec![2])),
            Err(DatasetError::HyperslabError(HyperslabError::OutOfBounds { .. }))
        ));
        let selection = Hyperslab::new_block(vec![u64::MAX, 0], vec![1, 1])?;
        assert!(matches!(
            dataset.retrieve_hyperslab(&selection, &Dataspace::new(vec![1])),
            Err(DatasetError::HyperslabError(HyperslabError::OutOfBounds { axis: 0, .. }))
        ));
        let selection = Hyperslab::new_block(vec![0, 0], vec![2, 1])?;
        assert!(matches!(
            dataset.retrieve_hyperslab(&selection, &Dataspace::new(vec![3])),
            Err(DatasetError::HyperslabError(HyperslabError::MemorySpaceMismatch { .. }))
        ));
        assert!(matches!(
            dataset.store_hyperslab(&selection, &Dataspace::new(vec![2]), &[0; 3]),
            Err(DatasetError::InvalidBytesLength { got: 3, expected: 4 })
        ));
        Ok(())
    }

    #[test]
    fn dataset_set_extent() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let dataset = chunked_dataset(&store)?;
        let all = Hyperslab::new_all(&dataset.dataspace()?);
        dataset.store_hyperslab(&all, &Dataspace::new(vec![16]), &[1; 32])?;
        assert_eq!(store.list_prefix(&"data/c/".try_into()?)?.len(), 4);

        dataset.set_extent(&[8, 4])?;
        assert_eq!(dataset.dataspace()?.shape(), &[8, 4]);
        assert!(matches!(
            dataset.set_extent(&[8, 5]),
            Err(DatasetError::DataspaceError(DataspaceError::ExceedsMaximum { .. }))
        ));

        dataset.set_extent(&[1, 4])?;
        assert!(store.get(&data_key(dataset.path(), &[0, 0]))?.is_some());
        assert!(store.get(&data_key(dataset.path(), &[1, 0]))?.is_none());
        assert!(store.get(&data_key(dataset.path(), &[1, 1]))?.is_none());

        dataset.set_extent(&[4, 4])?;
        let bytes = dataset.retrieve_hyperslab(
            &Hyperslab::new_all(&dataset.dataspace()?),
            &Dataspace::new(vec![16]),
        )?;
        let mut expected = vec![0x0101u16; 4];
        expected.resize(16, 0);
        assert_eq!(u16::from_bytes(&bytes)?, expected);
        Ok(())
    }

    #[test]
    fn dataset_set_extent_shrink_regrow() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let dataspace = Dataspace::new_with_maximum(vec![4], vec![MaximumExtent::Unlimited])?;
        let dataset = DatasetBuilder::new(DataType::UInt8, dataspace)
            .chunk_shape(vec![4])
            .create(store.clone(), &NodePath::new("/bytes")?)?;
        let all = Hyperslab::new_all(&dataset.dataspace()?);
        dataset.store_hyperslab(&all, &Dataspace::new(vec![4]), &[9; 4])?;

        dataset.set_extent(&[1])?;
        assert!(store.get(&data_key(dataset.path(), &[0]))?.is_some());
        dataset.set_extent(&[4])?;
        let bytes = dataset.retrieve_hyperslab(&all, &Dataspace::new(vec![4]))?;
        assert_eq!(bytes, vec![9, 0, 0, 0]);

        dataset.set_extent(&[0])?;
        assert!(store.get(&data_key(dataset.path(), &[0]))?.is_none());
        dataset.set_extent(&[2])?;
        let bytes = dataset.retrieve_hyperslab(
            &Hyperslab::new_all(&dataset.dataspace()?),
            &Dataspace::new(vec![2]),
        )?;
        assert_eq!(bytes, vec![0, 0]);
        Ok(())
    }

    #[test]
    fn dataset_contiguous() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let path = NodePath::new("/scalar")?;
        let dataset = DatasetBuilder::new(DataType::Float64, Dataspace::scalar())
            .create(store.clone(), &path)?;
        let all = Hyperslab::new_all(&dataset.dataspace()?);
        dataset.store_hyperslab(&all, &Dataspace::scalar(), &f64::to_bytes(&[1.5]))?;
        assert!(store.get(&data_key(&path, &[]))?.is_some());
        let bytes = dataset.retrieve_hyperslab(&all, &Dataspace::scalar())?;
        assert_eq!(f64::from_bytes(&bytes)?, vec![1.5]);
        assert!(matches!(
            dataset.set_extent(&[]),
            Err(DatasetError::DataspaceError(DataspaceError::NotExtendible))
        ));
        Ok(())
    }

    #[test]
    fn dataset_open() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            Dataset::open(store.clone(), "/data"),
            Err(DatasetError::NotFound(_))
        ));
        chunked_dataset(&store)?;
        let dataset = Dataset::open(store.clone(), "/data")?;
        assert_eq!(dataset.data_type()?, DataType::UInt16);
        assert_eq!(dataset.layout()?, DatasetLayout::Chunked);
        assert!(matches!(
            Dataset::open(store, "/"),
            Err(DatasetError::NotFound(_))
        ));
        Ok(())
    }
}
