//! Splitting a dataset into the blocks written by each rank.

use rustypmd::{Extent, Offset};

/// Assigns each of `size` ranks a block of a dataset of `total_extent`.
pub trait BlockSlicer {
    /// Offset and extent of the block of `rank`. Ranks outside `0..size`
    /// get an empty block.
    fn slice_block(&self, total_extent: &Extent, size: usize, rank: usize) -> (Offset, Extent);
}

/// Cuts the dataset along one dimension into nearly equal slabs.
///
/// The slab start of rank `r` is `ceil(N * r / size)`, computed without
/// overflowing `N * r`. Slab sizes differ by at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OneDimensionalBlockSlicer {
    pub dim: usize,
}

impl OneDimensionalBlockSlicer {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl BlockSlicer for OneDimensionalBlockSlicer {
    fn slice_block(&self, total_extent: &Extent, size: usize, rank: usize) -> (Offset, Extent) {
        let mut offset = vec![0; total_extent.len()];
        if rank >= size || self.dim >= total_extent.len() {
            return (offset, vec![0; total_extent.len()]);
        }

        let n = total_extent[self.dim];
        let size = size as u64;
        let start = |r: u64| {
            let pad = (n % size) * r;
            (n / size) * r + pad / size + u64::from(pad % size != 0)
        };

        let rank = rank as u64;
        offset[self.dim] = start(rank);
        let mut extent = total_extent.clone();
        extent[self.dim] = if rank + 1 >= size {
            n - offset[self.dim]
        } else {
            start(rank + 1) - offset[self.dim]
        };
        (offset, extent)
    }
}
