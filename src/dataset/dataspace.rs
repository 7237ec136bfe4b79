//! Dataspaces.

use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The maximum extent of one axis of a [`Dataspace`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum MaximumExtent {
    /// The axis can grow up to this extent.
    #[display("{_0}")]
    Finite(u64),
    /// The axis can grow without bound. Stored as `null`.
    #[display("unlimited")]
    Unlimited,
}

impl From<Option<u64>> for MaximumExtent {
    fn from(extent: Option<u64>) -> Self {
        extent.map_or(Self::Unlimited, Self::Finite)
    }
}

impl From<MaximumExtent> for Option<u64> {
    fn from(extent: MaximumExtent) -> Self {
        match extent {
            MaximumExtent::Finite(extent) => Some(extent),
            MaximumExtent::Unlimited => None,
        }
    }
}

impl MaximumExtent {
    /// Returns true if `extent` does not exceed the maximum.
    #[must_use]
    pub fn allows(self, extent: u64) -> bool {
        match self {
            Self::Finite(maximum) => extent <= maximum,
            Self::Unlimited => true,
        }
    }
}

/// A dataspace error.
#[derive(Debug, Error)]
pub enum DataspaceError {
    /// The rank of a shape does not match the dataspace rank.
    #[error("shape {shape:?} does not have rank {rank}")]
    RankMismatch {
        /// The shape.
        shape: Vec<u64>,
        /// The expected rank.
        rank: usize,
    },
    /// A shape exceeds the maximum shape.
    #[error("shape {shape:?} exceeds the maximum shape {}", format_maximum_shape(.maximum))]
    ExceedsMaximum {
        /// The shape.
        shape: Vec<u64>,
        /// The maximum shape.
        maximum: Vec<MaximumExtent>,
    },
    /// The dataset does not support changing its extent.
    #[error("the extent of a contiguous dataset cannot be changed")]
    NotExtendible,
}

/// A dataspace: the rank, current shape, and maximum shape of a dataset.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Dataspace {
    shape: Vec<u64>,
    maximum_shape: Vec<MaximumExtent>,
}

impl Dataspace {
    /// Create a fixed dataspace where the maximum shape equals `shape`.
    #[must_use]
    pub fn new(shape: Vec<u64>) -> Self {
        let maximum_shape = shape.iter().copied().map(MaximumExtent::Finite).collect();
        Self {
            shape,
            maximum_shape,
        }
    }

    /// Create a dataspace with a current `shape` and a `maximum_shape`.
    ///
    /// # Errors
    /// Returns [`DataspaceError`] if the ranks differ or `shape` exceeds `maximum_shape`.
    pub fn new_with_maximum(
        shape: Vec<u64>,
        maximum_shape: Vec<MaximumExtent>,
    ) -> Result<Self, DataspaceError> {
        validate_shape(&shape, &maximum_shape)?;
        Ok(Self {
            shape,
            maximum_shape,
        })
    }

    /// Create a dataspace of rank zero, holding a single element.
    #[must_use]
    pub fn scalar() -> Self {
        Self::new(vec![])
    }

    /// The rank (number of axes).
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The current shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The maximum shape.
    #[must_use]
    pub fn maximum_shape(&self) -> &[MaximumExtent] {
        &self.maximum_shape
    }

    /// The number of elements in the current shape. A dataspace of rank zero has one element.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Returns true if the maximum shape differs from the current shape on any axis.
    #[must_use]
    pub fn is_extendible(&self) -> bool {
        self.shape
            .iter()
            .zip(&self.maximum_shape)
            .any(|(&extent, &maximum)| maximum != MaximumExtent::Finite(extent))
    }

    /// Set the current shape.
    ///
    /// # Errors
    /// Returns [`DataspaceError`] if the rank of `shape` differs or `shape` exceeds the maximum shape.
    pub fn set_extent(&mut self, shape: &[u64]) -> Result<(), DataspaceError> {
        validate_shape(shape, &self.maximum_shape)?;
        self.shape = shape.to_vec();
        Ok(())
    }
}

fn format_maximum_shape(maximum_shape: &[MaximumExtent]) -> String {
    format!("[{}]", maximum_shape.iter().format(", "))
}

fn validate_shape(shape: &[u64], maximum_shape: &[MaximumExtent]) -> Result<(), DataspaceError> {
    if shape.len() != maximum_shape.len() {
        Err(DataspaceError::RankMismatch {
            shape: shape.to_vec(),
            rank: maximum_shape.len(),
        })
    } else if shape
        .iter()
        .zip(maximum_shape)
        .all(|(&extent, maximum)| maximum.allows(extent))
    {
        Ok(())
    } else {
        Err(DataspaceError::ExceedsMaximum {
            shape: shape.to_vec(),
            maximum: maximum_shape.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataspace_fixed() {
        let dataspace = Dataspace::new(vec![2, 3]);
        assert_eq!(dataspace.rank(), 2);
        assert_eq!(dataspace.num_elements(), 6);
        assert!(!dataspace.is_extendible());
        assert_eq!(Dataspace::scalar().num_elements(), 1);
        assert_eq!(Dataspace::new(vec![0, 3]).num_elements(), 0);
    }

    #[test]
    fn dataspace_extend() {
        let mut dataspace = Dataspace::new_with_maximum(
            vec![0, 4],
            vec![MaximumExtent::Unlimited, MaximumExtent::Finite(4)],
        )
        .unwrap();
        assert!(dataspace.is_extendible());
        dataspace.set_extent(&[10, 4]).unwrap();
        assert_eq!(dataspace.shape(), &[10, 4]);
        assert!(matches!(
            dataspace.set_extent(&[10, 5]),
            Err(DataspaceError::ExceedsMaximum { .. })
        ));
        assert!(matches!(
            dataspace.set_extent(&[10]),
            Err(DataspaceError::RankMismatch { .. })
        ));
        assert_eq!(
            dataspace.set_extent(&[1, 5]).unwrap_err().to_string(),
            "shape [1, 5] exceeds the maximum shape [unlimited, 4]"
        );
    }

    #[test]
    fn dataspace_invalid() {
        assert!(Dataspace::new_with_maximum(vec![3], vec![MaximumExtent::Finite(2)]).is_err());
    }

    #[test]
    fn maximum_extent_serde() {
        let maximum = vec![MaximumExtent::Unlimited, MaximumExtent::Finite(3)];
        let json = serde_json::to_string(&maximum).unwrap();
        assert_eq!(json, "[null,3]");
        assert_eq!(
            serde_json::from_str::<Vec<MaximumExtent>>(&json).unwrap(),
            maximum
        );
    }
}
