//! Descriptions of chunks already written to a dataset.

use crate::dataset::{Extent, Offset};

/// A hyperslab of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkInfo {
    pub offset: Offset,
    pub extent: Extent,
}

impl ChunkInfo {
    pub fn new(offset: Offset, extent: Extent) -> Self {
        Self { offset, extent }
    }
}

/// A chunk together with the id of the writer that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrittenChunkInfo {
    pub offset: Offset,
    pub extent: Extent,
    pub source_id: u32,
}

impl WrittenChunkInfo {
    pub fn new(offset: Offset, extent: Extent) -> Self {
        Self {
            offset,
            extent,
            source_id: 0,
        }
    }

    /// Negative source ids are clamped to 0.
    pub fn with_source(offset: Offset, extent: Extent, source_id: i64) -> Self {
        Self {
            offset,
            extent,
            source_id: source_id.clamp(0, u32::MAX as i64) as u32,
        }
    }

    pub fn chunk(&self) -> ChunkInfo {
        ChunkInfo::new(self.offset.clone(), self.extent.clone())
    }
}

/// All chunks known for one dataset.
pub type ChunkTable = Vec<WrittenChunkInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_source_is_clamped() {
        let c = WrittenChunkInfo::with_source(vec![0], vec![4], -3);
        assert_eq!(c.source_id, 0);
        assert_eq!(WrittenChunkInfo::with_source(vec![0], vec![4], 12).source_id, 12);
        assert_eq!(c.chunk(), ChunkInfo::new(vec![0], vec![4]));
    }
}
