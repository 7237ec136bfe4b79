//! Hyperslab selections.

use thiserror::Error;

use super::Dataspace;

/// A hyperslab error.
#[derive(Debug, Error)]
pub enum HyperslabError {
    /// The offset, stride, count, and block do not have the same length.
    #[error("hyperslab offset, stride, count and block must have the same rank")]
    InconsistentRank,
    /// A stride is zero or smaller than the block on an axis with a count greater than one.
    #[error("hyperslab stride {stride} is invalid for block {block} on axis {axis}")]
    InvalidStride {
        /// The axis.
        axis: usize,
        /// The stride.
        stride: u64,
        /// The block.
        block: u64,
    },
    /// The selection rank does not match the dataspace rank.
    #[error("hyperslab of rank {selection_rank} cannot select from a dataspace of rank {dataspace_rank}")]
    RankMismatch {
        /// The hyperslab rank.
        selection_rank: usize,
        /// The dataspace rank.
        dataspace_rank: usize,
    },
    /// The selection extends beyond the dataspace shape.
    #[error("hyperslab ends at {end} on axis {axis}, beyond the extent {extent}")]
    OutOfBounds {
        /// The axis.
        axis: usize,
        /// The exclusive end of the selection on the axis.
        end: u64,
        /// The extent of the axis.
        extent: u64,
    },
    /// The number of selected elements differs from the memory dataspace.
    #[error("hyperslab selects {selected} elements but the memory dataspace holds {memory}")]
    MemorySpaceMismatch {
        /// The number of selected elements.
        selected: u64,
        /// The number of elements in the memory dataspace.
        memory: u64,
    },
}

/// A rectangular selection of a dataspace.
///
/// On each axis, `count` blocks of `block` consecutive elements are selected, starting at `offset` and separated by `stride`.
/// Selected elements are ordered row-major (last axis fastest).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Hyperslab {
    offset: Vec<u64>,
    stride: Vec<u64>,
    count: Vec<u64>,
    block: Vec<u64>,
}

impl Hyperslab {
    /// Create a new hyperslab.
    ///
    /// # Errors
    /// Returns [`HyperslabError`] if the lengths differ, or a stride is zero or smaller than its block where the count exceeds one.
    pub fn new(
        offset: Vec<u64>,
        stride: Vec<u64>,
        count: Vec<u64>,
        block: Vec<u64>,
    ) -> Result<Self, HyperslabError> {
        let rank = offset.len();
        if stride.len() != rank || count.len() != rank || block.len() != rank {
            return Err(HyperslabError::InconsistentRank);
        }
        for (axis, ((&stride, &count), &block)) in stride.iter().zip(&count).zip(&block).enumerate() {
            if stride == 0 || (count > 1 && stride < block) {
                return Err(HyperslabError::InvalidStride {
                    axis,
                    stride,
                    block,
                });
            }
        }
        Ok(Self {
            offset,
            stride,
            count,
            block,
        })
    }

    /// Create a hyperslab selecting one contiguous `block` at `offset` (stride 1, count 1).
    ///
    /// # Errors
    /// Returns [`HyperslabError::InconsistentRank`] if `offset` and `block` have different lengths.
    pub fn new_block(offset: Vec<u64>, block: Vec<u64>) -> Result<Self, HyperslabError> {
        let rank = offset.len();
        Self::new(offset, vec![1; rank], vec![1; rank], block)
    }

    /// Create a hyperslab selecting the whole current extent of `dataspace`.
    #[must_use]
    pub fn new_all(dataspace: &Dataspace) -> Self {
        let rank = dataspace.rank();
        Self {
            offset: vec![0; rank],
            stride: vec![1; rank],
            count: vec![1; rank],
            block: dataspace.shape().to_vec(),
        }
    }

    /// The rank of the selection.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.offset.len()
    }

    /// The offset.
    #[must_use]
    pub fn offset(&self) -> &[u64] {
        &self.offset
    }

    /// The stride.
    #[must_use]
    pub fn stride(&self) -> &[u64] {
        &self.stride
    }

    /// The count.
    #[must_use]
    pub fn count(&self) -> &[u64] {
        &self.count
    }

    /// The block.
    #[must_use]
    pub fn block(&self) -> &[u64] {
        &self.block
    }

    /// The number of selected elements on each axis.
    #[must_use]
    pub fn shape(&self) -> Vec<u64> {
        self.count
            .iter()
            .zip(&self.block)
            .map(|(count, block)| count * block)
            .collect()
    }

    /// The number of selected elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape().iter().product()
    }

    /// Validate that the selection lies within the current shape of `dataspace`.
    ///
    /// # Errors
    /// Returns [`HyperslabError`] if the ranks differ or the selection ends beyond the current shape.
    pub fn validate(&self, dataspace: &Dataspace) -> Result<(), HyperslabError> {
        if self.rank() != dataspace.rank() {
            return Err(HyperslabError::RankMismatch {
                selection_rank: self.rank(),
                dataspace_rank: dataspace.rank(),
            });
        }
        for (axis, &extent) in dataspace.shape().iter().enumerate() {
            if self.count[axis] == 0 || self.block[axis] == 0 {
                continue;
            }
            let end = (self.count[axis] - 1)
                .checked_mul(self.stride[axis])
                .and_then(|span| span.checked_add(self.offset[axis]))
                .and_then(|start| start.checked_add(self.block[axis]));
            match end {
                Some(end) if end <= extent => {}
                _ => {
                    return Err(HyperslabError::OutOfBounds {
                        axis,
                        end: end.unwrap_or(u64::MAX),
                        extent,
                    })
                }
            }
        }
        Ok(())
    }

    /// The selected indices on each axis, in increasing order.
    #[must_use]
    pub fn axis_indices(&self) -> Vec<Vec<u64>> {
        (0..self.rank())
            .map(|axis| {
                (0..self.count[axis])
                    .flat_map(|c| {
                        let start = self.offset[axis] + c * self.stride[axis];
                        start..start + self.block[axis]
                    })
                    .collect()
            })
            .collect()
    }

    /// Visit the coordinates of every selected element in row-major order.
    pub fn for_each_coordinate(&self, mut f: impl FnMut(&[u64])) {
        let axis_indices = self.axis_indices();
        if axis_indices.iter().any(Vec::is_empty) {
            return;
        }
        let rank = self.rank();
        let mut position = vec![0usize; rank];
        let mut coordinate: Vec<u64> = axis_indices.iter().map(|indices| indices[0]).collect();
        loop {
            f(&coordinate);
            // advance the last axis fastest
            let mut axis = rank;
            loop {
                if axis == 0 {
                    return;
                }
                axis -= 1;
                position[axis] += 1;
                if position[axis] < axis_indices[axis].len() {
                    coordinate[axis] = axis_indices[axis][position[axis]];
                    break;
                }
                position[axis] = 0;
                coordinate[axis] = axis_indices[axis][0];
            }
        }
    }
}
