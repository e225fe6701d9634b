//! Core value types for openPMD-style scientific data.
//!
//! This crate has no I/O. It defines what the other rustypmd crates move around:
//!
//! - [`Datatype`]: the element type tag used by attributes and datasets
//! - [`Attribute`]: a typed attribute value with lenient conversion via [`AttributeType`]
//! - [`DataBuffer`] and [`Element`]: typed chunk payloads
//! - [`Dataset`], [`Extent`], [`Offset`]: dataset descriptions
//! - [`ChunkInfo`], [`WrittenChunkInfo`]: chunk bookkeeping
//! - [`UnitDimension`]: SI base quantity exponents
//!
//! # Example
//!
//! ```
//! use rustypmd_format::{Attribute, Datatype};
//!
//! let spacing = Attribute::from(vec![0.5f32, 0.5]);
//! assert_eq!(spacing.dtype(), Datatype::VecFloat);
//! assert_eq!(spacing.get::<Vec<f64>>().unwrap(), vec![0.5, 0.5]);
//! ```

pub mod attribute;
pub mod buffer;
pub mod chunk;
pub mod dataset;
pub mod datatype;
pub mod error;
pub mod unit_dimension;

pub use attribute::{Attribute, AttributeType};
pub use buffer::{DataBuffer, Element};
pub use chunk::{ChunkInfo, ChunkTable, WrittenChunkInfo};
pub use dataset::{num_elements, Dataset, Extent, Offset};
pub use datatype::Datatype;
pub use error::FormatError;
pub use unit_dimension::UnitDimension;
