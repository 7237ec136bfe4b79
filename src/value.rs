//! Dataset values.
//!
//! A [`DatasetValue`] is a Rust type that can be stored as one instance in a dataset.
//! Every implementation belongs to exactly one [`ValueCategory`], which fixes its rank and which parts of its shape are carried by the type:
//!
//! | Category | Types | Rank | Shape | [`Extents`](DatasetValue::Extents) |
//! |---|---|---|---|---|
//! | [`Scalar`](ValueCategory::Scalar) | `E` | 0 | `[]` | `()` |
//! | [`FixedArray`](ValueCategory::FixedArray) | `[E; N]` | 1 | `[N]` | `()` |
//! | [`MultiArray`](ValueCategory::MultiArray) | `ndarray::Array<E, D>` | `D::NDIM` | the array shape | `D` |
//! | [`VectorScalar`](ValueCategory::VectorScalar) | `Vec<E>` | 1 | `[len]` | `usize` |
//! | [`VectorFixedArray`](ValueCategory::VectorFixedArray) | `Vec<[E; N]>` | 2 | `[len, N]` | `usize` |
//!
//! where `E` is any [`Element`].
//! Other types do not implement [`DatasetValue`] and are rejected at compile time, as are arrays with dynamic dimensionality ([`ndarray::IxDyn`]).

use std::{borrow::Cow, fmt::Debug};

use derive_more::Display;
use thiserror::Error;

use crate::dataset::Element;

/// The category of a [`DatasetValue`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum ValueCategory {
    /// A single element.
    #[display("scalar")]
    Scalar,
    /// An array with a length fixed by its type.
    #[display("fixed array")]
    FixedArray,
    /// A multidimensional array with a rank fixed by its type.
    #[display("multidimensional array")]
    MultiArray,
    /// A vector of elements.
    #[display("vector")]
    VectorScalar,
    /// A vector of fixed length arrays.
    #[display("vector of fixed arrays")]
    VectorFixedArray,
}

/// A value assignment error.
#[derive(Debug, Error)]
pub enum ValueAssignError {
    /// The shape cannot be held by the value type.
    #[error("a {category} value of rank {rank} cannot have shape {shape:?}")]
    IncompatibleShape {
        /// The category of the value.
        category: ValueCategory,
        /// The rank of the value.
        rank: usize,
        /// The shape.
        shape: Vec<u64>,
    },
    /// The number of elements does not match the shape.
    #[error("{count} elements do not match shape {shape:?}")]
    ElementCount {
        /// The shape.
        shape: Vec<u64>,
        /// The number of elements.
        count: usize,
    },
}

/// A value that can be stored as one instance in a dataset.
///
/// Elements of a value are in row-major order.
pub trait DatasetValue: Sized {
    /// The element type.
    type Element: Element;

    /// The runtime extents of the shape that are not carried by the type.
    type Extents: Clone + Debug;

    /// The value category.
    const CATEGORY: ValueCategory;

    /// The rank of the value.
    const RANK: usize;

    /// The shape of a value with `extents`.
    fn shape_from_extents(extents: &Self::Extents) -> Vec<u64>;

    /// The extents of the value.
    fn extents(&self) -> Self::Extents;

    /// The shape of the value.
    fn shape(&self) -> Vec<u64> {
        Self::shape_from_extents(&self.extents())
    }

    /// Returns true if a value of this type can have `shape`.
    fn is_compatible_shape(shape: &[u64]) -> bool;

    /// The elements of the value.
    fn elements(&self) -> Cow<'_, [Self::Element]>;

    /// Replace the value with `elements` of `shape`, resizing it if its type allows.
    ///
    /// # Errors
    /// Returns [`ValueAssignError`] if `shape` is incompatible with the type, or the number of elements does not match `shape`.
    fn assign_elements(
        &mut self,
        shape: &[u64],
        elements: Vec<Self::Element>,
    ) -> Result<(), ValueAssignError>;
}

fn validate_assignment<T: DatasetValue>(shape: &[u64], count: usize) -> Result<(), ValueAssignError> {
    if !T::is_compatible_shape(shape) {
        return Err(ValueAssignError::IncompatibleShape {
            category: T::CATEGORY,
            rank: T::RANK,
            shape: shape.to_vec(),
        });
    }
    let num_elements = shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(usize::try_from(extent).ok()?));
    if num_elements == Some(count) {
        Ok(())
    } else {
        Err(ValueAssignError::ElementCount {
            shape: shape.to_vec(),
            count,
        })
    }
}

macro_rules! impl_dataset_value {
    ($($element:ty),* $(,)?) => {
        $(
            impl DatasetValue for $element {
                type Element = $element;
                type Extents = ();
                const CATEGORY: ValueCategory = ValueCategory::Scalar;
                const RANK: usize = 0;

                fn shape_from_extents(_extents: &()) -> Vec<u64> {
                    vec![]
                }

                fn extents(&self) {}

                fn is_compatible_shape(shape: &[u64]) -> bool {
                    shape.is_empty()
                }

                fn elements(&self) -> Cow<'_, [$element]> {
                    Cow::Borrowed(std::slice::from_ref(self))
                }

                fn assign_elements(&mut self, shape: &[u64], elements: Vec<$element>) -> Result<(), ValueAssignError> {
                    validate_assignment::<Self>(shape, elements.len())?;
                    *self = elements[0];
                    Ok(())
                }
            }

            impl<const N: usize> DatasetValue for [$element; N] {
                type Element = $element;
                type Extents = ();
                const CATEGORY: ValueCategory = ValueCategory::FixedArray;
                const RANK: usize = 1;

                fn shape_from_extents(_extents: &()) -> Vec<u64> {
                    vec![N as u64]
                }

                fn extents(&self) {}

                fn is_compatible_shape(shape: &[u64]) -> bool {
                    shape == [N as u64]
                }

                fn elements(&self) -> Cow<'_, [$element]> {
                    Cow::Borrowed(self.as_slice())
                }

                fn assign_elements(&mut self, shape: &[u64], elements: Vec<$element>) -> Result<(), ValueAssignError> {
                    validate_assignment::<Self>(shape, elements.len())?;
                    self.copy_from_slice(&elements);
                    Ok(())
                }
            }

            impl DatasetValue for Vec<$element> {
                type Element = $element;
                type Extents = usize;
                const CATEGORY: ValueCategory = ValueCategory::VectorScalar;
                const RANK: usize = 1;

                fn shape_from_extents(len: &usize) -> Vec<u64> {
                    vec![*len as u64]
                }

                fn extents(&self) -> usize {
                    self.len()
                }

                fn is_compatible_shape(shape: &[u64]) -> bool {
                    shape.len() == 1
                }

                fn elements(&self) -> Cow<'_, [$element]> {
                    Cow::Borrowed(self.as_slice())
                }

                fn assign_elements(&mut self, shape: &[u64], elements: Vec<$element>) -> Result<(), ValueAssignError> {
                    validate_assignment::<Self>(shape, elements.len())?;
                    *self = elements;
                    Ok(())
                }
            }

            impl<const N: usize> DatasetValue for Vec<[$element; N]> {
                type Element = $element;
                type Extents = usize;
                const CATEGORY: ValueCategory = ValueCategory::VectorFixedArray;
                const RANK: usize = 2;

                fn shape_from_extents(len: &usize) -> Vec<u64> {
                    vec![*len as u64, N as u64]
                }

                fn extents(&self) -> usize {
                    self.len()
                }

                fn is_compatible_shape(shape: &[u64]) -> bool {
                    shape.len() == 2 && shape[1] == N as u64
                }

                fn elements(&self) -> Cow<'_, [$element]> {
                    Cow::Owned(self.iter().flatten().copied().collect())
                }

                fn assign_elements(&mut self, shape: &[u64], elements: Vec<$element>) -> Result<(), ValueAssignError> {
                    validate_assignment::<Self>(shape, elements.len())?;
                    let len = usize::try_from(shape[0]).unwrap_or_default();
                    *self = if N == 0 {
                        vec![[<$element>::default(); N]; len]
                    } else {
                        elements
                            .chunks_exact(N)
                            .map(|chunk| {
                                let mut array = [<$element>::default(); N];
                                array.copy_from_slice(chunk);
                                array
                            })
                            .collect()
                    };
                    Ok(())
                }
            }

            #[cfg(feature = "ndarray")]
            impl<D: ndarray::Dimension> DatasetValue for ndarray::Array<$element, D> {
                type Element = $element;
                type Extents = D;
                const CATEGORY: ValueCategory = ValueCategory::MultiArray;
                const RANK: usize = match D::NDIM {
                    Some(ndim) => ndim,
                    None => panic!("arrays with dynamic dimensionality are not dataset values"),
                };

                fn shape_from_extents(extents: &D) -> Vec<u64> {
                    extents.slice().iter().map(|&extent| extent as u64).collect()
                }

                fn extents(&self) -> D {
                    self.raw_dim()
                }

                fn is_compatible_shape(shape: &[u64]) -> bool {
                    shape.len() == Self::RANK
                }

                fn elements(&self) -> Cow<'_, [$element]> {
                    match self.as_slice() {
                        Some(elements) => Cow::Borrowed(elements),
                        None => Cow::Owned(self.iter().copied().collect()),
                    }
                }

                fn assign_elements(&mut self, shape: &[u64], elements: Vec<$element>) -> Result<(), ValueAssignError> {
                    validate_assignment::<Self>(shape, elements.len())?;
                    let mut dim = D::zeros(Self::RANK);
                    for (axis, &extent) in dim.slice_mut().iter_mut().zip(shape) {
                        *axis = usize::try_from(extent).unwrap_or_default();
                    }
                    *self = ndarray::Array::from_shape_vec(dim, elements).map_err(|_| {
                        ValueAssignError::IncompatibleShape {
                            category: Self::CATEGORY,
                            rank: Self::RANK,
                            shape: shape.to_vec(),
                        }
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

impl_dataset_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    half::f16,
    f32,
    f64,
    num_complex::Complex32,
    num_complex::Complex64,
);
