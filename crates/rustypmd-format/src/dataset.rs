//! Dataset descriptions: element type, extent, chunking and compression.

use crate::datatype::Datatype;
use crate::error::FormatError;

/// Size of a dataset or chunk, one entry per dimension.
pub type Extent = Vec<u64>;
/// Position of a chunk inside a dataset, one entry per dimension.
pub type Offset = Vec<u64>;

/// Number of elements covered by an extent.
pub fn num_elements(extent: &[u64]) -> u64 {
    extent.iter().product()
}

/// Description of an n-dimensional, homogeneous dataset.
///
/// ```
/// use rustypmd_format::{Dataset, Datatype};
///
/// let ds = Dataset::new(Datatype::Double, vec![100, 100])
///     .with_chunk_size(vec![10, 10])
///     .unwrap();
/// assert_eq!(ds.rank, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub dtype: Datatype,
    pub extent: Extent,
    pub rank: u8,
    pub chunk_size: Extent,
    /// Compression format name, e.g. `"zlib"`. Empty means uncompressed.
    pub compression: String,
    pub compression_level: u8,
    /// Name of a backend-specific transform, empty if none.
    pub transform: String,
    /// Backend options in JSON or TOML text.
    pub options: String,
}

impl Dataset {
    pub fn new(dtype: Datatype, extent: Extent) -> Self {
        let rank = extent.len() as u8;
        Self {
            dtype,
            chunk_size: extent.clone(),
            extent,
            rank,
            compression: String::new(),
            compression_level: 0,
            transform: String::new(),
            options: String::new(),
        }
    }

    /// Grow the extent. The rank must stay the same and no dimension may shrink.
    pub fn extend(&mut self, new_extent: Extent) -> Result<&mut Self, FormatError> {
        if new_extent.len() != self.extent.len() {
            return Err(FormatError::DatasetExtend(format!(
                "dimensionality mismatch: dataset has rank {}, new extent has rank {}",
                self.extent.len(),
                new_extent.len()
            )));
        }
        for (i, (&new, &old)) in new_extent.iter().zip(&self.extent).enumerate() {
            if new < old {
                return Err(FormatError::DatasetExtend(format!(
                    "new extent {new} in dimension {i} is smaller than current extent {old}"
                )));
            }
        }
        self.extent = new_extent;
        Ok(self)
    }

    pub fn set_chunk_size(&mut self, chunk_size: Extent) -> Result<&mut Self, FormatError> {
        if chunk_size.len() != self.extent.len() {
            return Err(FormatError::InvalidChunkSize(format!(
                "chunk rank {} does not match dataset rank {}",
                chunk_size.len(),
                self.extent.len()
            )));
        }
        if chunk_size.contains(&0) {
            return Err(FormatError::InvalidChunkSize(
                "chunk dimensions must be non-zero".to_string(),
            ));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_chunk_size(mut self, chunk_size: Extent) -> Result<Self, FormatError> {
        self.set_chunk_size(chunk_size)?;
        Ok(self)
    }

    /// Request compression. `zlib` accepts levels 0 to 9.
    pub fn set_compression(&mut self, format: &str, level: u8) -> Result<&mut Self, FormatError> {
        match format {
            "zlib" if level > 9 => {
                return Err(FormatError::InvalidCompression(format!(
                    "zlib level must be in 0..=9, got {level}"
                )))
            }
            "" => {
                return Err(FormatError::InvalidCompression(
                    "empty compression format".to_string(),
                ))
            }
            _ => {}
        }
        self.compression = format.to_string();
        self.compression_level = level;
        Ok(self)
    }

    pub fn set_custom_transform(&mut self, transform: &str) -> &mut Self {
        self.transform = transform.to_string();
        self
    }

    pub fn num_elements(&self) -> u64 {
        num_elements(&self.extent)
    }
}
