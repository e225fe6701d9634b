//! openPMD-style data model: series of iterations holding meshes and
//! particle species.
//!
//! A [`Series`] owns the I/O handler. Everything below it (iterations,
//! meshes, records, record components) only queues tasks; nothing is written
//! before [`Series::flush`] or before the series is dropped.
//!
//! ```text
//! Series
//! └── iterations: Container<u64, Iteration>
//!     ├── meshes: Container<String, Mesh>
//!     │   └── Mesh ── components: MeshRecordComponent (or SCALAR)
//!     └── particles: Container<String, ParticleSpecies>
//!         ├── Record ── components: RecordComponent
//!         └── particle_patches: Container<String, PatchRecord>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rustypmd::{Access, Dataset, Datatype, Series, UnitDimension};
//! use std::collections::BTreeMap;
//!
//! let mut series = Series::new("out/fields.json", Access::Create)?;
//! let it = series.iterations.get_or_create(0u64)?;
//! let e = it.meshes.get_or_create("E")?;
//! e.set_unit_dimension(&BTreeMap::from([
//!     (UnitDimension::M, 1.0),
//!     (UnitDimension::L, 1.0),
//!     (UnitDimension::T, -3.0),
//!     (UnitDimension::I, -1.0),
//! ]))?;
//! for axis in ["x", "y"] {
//!     let c = e.get_or_create(axis)?;
//!     c.reset_dataset(Dataset::new(Datatype::Double, vec![4]))?;
//!     c.store_chunk(vec![0.0f64; 4], vec![0], vec![4])?;
//! }
//! series.flush()?;
//!
//! let mut read = Series::new("out/fields.json", Access::ReadOnly)?;
//! let x = read.iterations.get_mut(&0u64).unwrap().meshes.get_mut("E").unwrap().get_mut("x").unwrap();
//! let data: Vec<f64> = x.load_chunk(vec![], vec![])?;
//! assert_eq!(data.len(), 4);
//! # Ok::<(), rustypmd::Error>(())
//! ```

pub mod attributable;
pub mod container;
pub mod error;
pub mod helper;
pub mod iteration;
pub mod mesh;
pub mod particle;
pub mod record;
pub mod record_component;
pub mod series;
pub mod series_iterator;

pub use attributable::{Attributable, HasAttributable, ReadMode};
pub use container::{Container, ContainerElement};
pub use error::{Error, Result};
pub use helper::list_series;
pub use iteration::Iteration;
pub use mesh::{DataOrder, Geometry, Mesh};
pub use particle::{ParticlePatches, ParticleSpecies};
pub use record::{BaseRecord, PatchRecord, Record, SCALAR};
pub use record_component::{
    Component, MeshRecordComponent, PatchRecordComponent, RecordComponent,
};
pub use series::{Series, OPENPMD_VERSION};
pub use series_iterator::{ReadIterations, WriteIterations};

pub use rustypmd_format::{
    Attribute, AttributeType, ChunkTable, Dataset, Datatype, Element, Extent, Offset,
    UnitDimension, WrittenChunkInfo,
};
pub use rustypmd_io::{Access, BackendConfig, Format, IterationEncoding, SeriesOptions};
