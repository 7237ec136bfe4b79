//! Typed unique and record datasets over a chunked, [Zarr V3](https://zarr.dev) style hierarchy.
//!
//! `zarrs_dataset` persists and retrieves strongly typed values (scalars, fixed-size arrays, vectors, vectors of fixed-size arrays, and multidimensional arrays) without hand-written shape bookkeeping.
//! The shape and rank of a value are derived from its type through the [`DatasetValue`] trait, and two storage shapes are supported:
//!  - a [unique dataset](unique_dataset) holds exactly one value, with the shape of the value, and
//!  - a [record dataset](chunked_dataset) holds a growable sequence of values with the same shape, one compressed chunk per record.
//!
//! Datasets live in a hierarchy of [groups](group) within a [store](storage::store).
//! Every node has a `zarr.json` metadata document, and dataset chunks are stored under `<path>/c/`.
//!
//! ## Getting Started
//! - [`group::Group`] is the location that dataset names are resolved against, see [`Group::open_or_create_group`](group::Group::open_or_create_group), [`Group::exists_group`](group::Group::exists_group), and [`Group::exists_dataset`](group::Group::exists_dataset).
//! - [`unique_dataset`] and [`chunked_dataset`] are the typed interfaces.
//! - [`dataset::Dataset`] and [`dataset::DatasetBuilder`] are the untyped interfaces the typed interfaces are built on.
//! - [`storage::storage_adapter::UsageLogStorageAdapter`] logs storage access.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_dataset::{
//!     chunked_dataset::{append_record, create_chunked_dataset, read_record, RecordCapacity},
//!     group::Group,
//!     storage::store::MemoryStore,
//!     unique_dataset::{read_unique_dataset_at, write_unique_dataset_at},
//! };
//!
//! let root = Group::root(Arc::new(MemoryStore::new()));
//! let run = root.open_or_create_group("/runs/0")?;
//!
//! write_unique_dataset_at(&run, "settings", &[0.5f64, 1.5, 2.5])?;
//! let mut settings = [0.0f64; 3];
//! read_unique_dataset_at(&run, "settings", &mut settings)?;
//! assert_eq!(settings, [0.5, 1.5, 2.5]);
//!
//! let frames = create_chunked_dataset::<Vec<u16>, _>(&run, "frames", &4, RecordCapacity::Bounded(100))?;
//! for frame in 0..10u16 {
//!     append_record(&frames, &vec![frame; 4])?;
//! }
//! let mut frame = Vec::<u16>::new();
//! assert_eq!(read_record(&frames, &mut frame, -1)?, 9);
//! assert_eq!(frame, vec![9; 4]);
//!
//! assert!(root.exists_dataset("/runs/0/frames"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: implements [`DatasetValue`] for [`ndarray`] arrays of fixed dimensionality.
//!
//! ## Licence
//! `zarrs_dataset` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod chunked_dataset;
pub mod config;
pub mod dataset;
pub mod group;
pub mod node;
pub mod storage;
pub mod unique_dataset;
pub mod value;

pub use chunked_dataset::{RecordCapacity, RecordIndex};
pub use dataset::{Dataset, DatasetError};
pub use group::Group;
pub use unique_dataset::DatasetCreateOptions;
pub use value::{DatasetValue, ValueCategory};

#[cfg(feature = "ndarray")]
/// Re-export [`ndarray`].
pub use ndarray;
