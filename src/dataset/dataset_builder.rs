use std::sync::Arc;

use crate::{
    group::create_intermediate_groups,
    node::{NodeMetadata, NodePath},
    storage::{erase_node, retrieve_metadata, store_metadata, ReadableWritableStorageTraits},
};

use super::{
    codec::{CodecChain, GzipCompressionLevel},
    DataType, Dataset, DatasetError, DatasetLayout, DatasetMetadata, Dataspace,
};

/// A [`Dataset`] builder.
///
/// The builder is initialised with a data type and dataspace, with a contiguous layout and no compression.
/// Use [`chunk_shape`](DatasetBuilder::chunk_shape) to select a chunked layout (required for an extendible dataspace or compression).
///
/// ```rust
/// # use std::sync::Arc;
/// # use zarrs_dataset::{dataset::{DatasetBuilder, DataType, Dataspace, GzipCompressionLevel, MaximumExtent}, node::NodePath, storage::store::MemoryStore};
/// let store = Arc::new(MemoryStore::new());
/// let dataspace = Dataspace::new_with_maximum(vec![0, 3], vec![MaximumExtent::Unlimited, MaximumExtent::Finite(3)])?;
/// let dataset = DatasetBuilder::new(DataType::Float32, dataspace)
///     .chunk_shape(vec![1, 3])
///     .compression(Some(GzipCompressionLevel::DEFAULT))
///     .create(store, &NodePath::new("/group/records")?)?;
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DatasetBuilder {
    data_type: DataType,
    dataspace: Dataspace,
    chunk_shape: Option<Vec<u64>>,
    compression: Option<GzipCompressionLevel>,
}

impl DatasetBuilder {
    /// Create a new dataset builder.
    #[must_use]
    pub fn new(data_type: DataType, dataspace: Dataspace) -> Self {
        Self {
            data_type,
            dataspace,
            chunk_shape: None,
            compression: None,
        }
    }

    /// Use a chunked layout with a regular `chunk_shape`.
    pub fn chunk_shape(&mut self, chunk_shape: Vec<u64>) -> &mut Self {
        self.chunk_shape = Some(chunk_shape);
        self
    }

    /// Set the gzip compression level, or disable compression with [`None`].
    pub fn compression(&mut self, compression: Option<GzipCompressionLevel>) -> &mut Self {
        self.compression = compression;
        self
    }

    /// The layout of the dataset to build.
    #[must_use]
    pub fn layout(&self) -> DatasetLayout {
        if self.chunk_shape.is_some() {
            DatasetLayout::Chunked
        } else {
            DatasetLayout::Contiguous
        }
    }

    /// Build the metadata of a dataset at `path`.
    ///
    /// # Errors
    /// Returns [`DatasetError::CreationError`] if the builder configuration is invalid.
    pub fn build_metadata(&self, path: &NodePath) -> Result<DatasetMetadata, DatasetError> {
        let chunk_shape = match &self.chunk_shape {
            Some(chunk_shape) => chunk_shape.clone(),
            None => self.dataspace.shape().iter().map(|&extent| extent.max(1)).collect(),
        };
        let metadata = DatasetMetadata::new(
            self.data_type,
            &self.dataspace,
            self.layout(),
            chunk_shape,
            &CodecChain::new(self.data_type, self.compression),
        );
        metadata
            .validate()
            .map_err(|err| DatasetError::CreationError(path.clone(), err))?;
        Ok(metadata)
    }

    /// Create a dataset at `path`, and any missing intermediate groups.
    ///
    /// # Errors
    /// Returns [`DatasetError::CreationError`] if a node already exists at `path`, `path` is the root, an intermediate group cannot be created, or the builder configuration is invalid.
    pub fn create<TStorage: ?Sized + ReadableWritableStorageTraits>(
        &self,
        storage: Arc<TStorage>,
        path: &NodePath,
    ) -> Result<Dataset<TStorage>, DatasetError> {
        let creation_error = |err: String| DatasetError::CreationError(path.clone(), err);
        if path.is_root() {
            return Err(creation_error("the root node must be a group".to_string()));
        }
        let metadata = self.build_metadata(path)?;
        match retrieve_metadata(&*storage, path) {
            Ok(None) => {}
            Ok(Some(_)) => return Err(creation_error("a node already exists".to_string())),
            Err(err) => return Err(creation_error(err.to_string())),
        }
        create_intermediate_groups(&*storage, path).map_err(|err| creation_error(err.to_string()))?;
        store_metadata(&*storage, path, &NodeMetadata::Dataset(metadata))
            .map_err(|err| creation_error(err.to_string()))?;
        Ok(Dataset::new(storage, path.clone()))
    }

    /// Create a dataset at `path`, first erasing any existing node (and its children) at `path`.
    ///
    /// Replacement is not atomic: if creation fails after the erase, no node remains at `path`.
    /// Failure to erase is ignored, creation then reports the problem.
    ///
    /// # Errors
    /// Returns [`DatasetError::CreationError`] on the same conditions as [`create`](DatasetBuilder::create).
    pub fn replace<TStorage: ?Sized + ReadableWritableStorageTraits>(
        &self,
        storage: Arc<TStorage>,
        path: &NodePath,
    ) -> Result<Dataset<TStorage>, DatasetError> {
        if !path.is_root() {
            let _ = erase_node(&*storage, path);
        }
        self.create(storage, path)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dataset::MaximumExtent,
        storage::{meta_key, store::MemoryStore, ReadableStorageTraits},
    };

    use super::*;

    #[test]
    fn dataset_builder_create() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let path = NodePath::new("/a/b/data")?;
        let dataset =
            DatasetBuilder::new(DataType::Int32, Dataspace::new(vec![2, 2])).create(store.clone(), &path)?;
        assert_eq!(dataset.layout()?, DatasetLayout::Contiguous);
        assert_eq!(dataset.metadata()?.chunk_shape(), &[2, 2]);
        assert!(store.get(&meta_key(&NodePath::new("/a")?))?.is_some());
        assert!(store.get(&meta_key(&NodePath::new("/a/b")?))?.is_some());

        assert!(matches!(
            DatasetBuilder::new(DataType::Int32, Dataspace::new(vec![2])).create(store.clone(), &path),
            Err(DatasetError::CreationError(..))
        ));
        assert!(matches!(
            DatasetBuilder::new(DataType::Int32, Dataspace::new(vec![2]))
                .create(store.clone(), &NodePath::new("/a/b/data/child")?),
            Err(DatasetError::CreationError(..))
        ));
        assert!(matches!(
            DatasetBuilder::new(DataType::Int32, Dataspace::scalar()).create(store, &NodePath::root()),
            Err(DatasetError::CreationError(..))
        ));
        Ok(())
    }

    #[test]
    fn dataset_builder_invalid_configuration() -> Result<(), Box<dyn std::error::Error>> {
        let path = NodePath::new("/data")?;
        let extendible =
            Dataspace::new_with_maximum(vec![0], vec![MaximumExtent::Unlimited])?;
        assert!(DatasetBuilder::new(DataType::UInt8, extendible.clone())
            .build_metadata(&path)
            .is_err());
        assert!(DatasetBuilder::new(DataType::UInt8, extendible)
            .chunk_shape(vec![4])
            .build_metadata(&path)
            .is_ok());
        assert!(DatasetBuilder::new(DataType::UInt8, Dataspace::new(vec![4]))
            .compression(Some(GzipCompressionLevel::DEFAULT))
            .build_metadata(&path)
            .is_err());
        assert!(DatasetBuilder::new(DataType::UInt8, Dataspace::new(vec![4]))
            .chunk_shape(vec![4, 1])
            .build_metadata(&path)
            .is_err());
        Ok(())
    }

    #[test]
    fn dataset_builder_replace() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let path = NodePath::new("/data")?;
        DatasetBuilder::new(DataType::Int32, Dataspace::new(vec![2])).create(store.clone(), &path)?;
        let dataset =
            DatasetBuilder::new(DataType::Float64, Dataspace::new(vec![3])).replace(store, &path)?;
        let metadata = dataset.metadata()?;
        assert_eq!(metadata.shape, vec![3]);
        assert_eq!(metadata.data_type, DataType::Float64);
        Ok(())
    }
}
