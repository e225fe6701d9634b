//! Throughput benchmark for rustypmd series.
//!
//! A [`Benchmark`] writes one scalar mesh per iteration, split into blocks by
//! a [`BlockSlicer`] as if several ranks wrote in parallel, and reads the
//! blocks back. Ranks are simulated one after the other in a single process;
//! only data generation runs in parallel (with the `parallel` feature).
//!
//! ```no_run
//! use rand::distributions::Uniform;
//! use rustypmd_bench::{
//!     Benchmark, OneDimensionalBlockSlicer, RandomDatasetFiller, SimpleDatasetFillerProvider,
//! };
//!
//! let filler = RandomDatasetFiller::new(Uniform::new(0.0f64, 1.0), 0).with_seed(1);
//! let mut bench = Benchmark::new(
//!     "out/bench",
//!     vec![1000, 100],
//!     OneDimensionalBlockSlicer::new(0),
//!     SimpleDatasetFillerProvider::new(filler),
//! );
//! bench.add_configuration("", 0, "json", 4, 3);
//! let report = bench.run()?;
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! # Ok::<(), rustypmd_bench::Error>(())
//! ```

pub mod benchmark;
pub mod block_slicer;
pub mod dataset_filler;
pub mod error;
pub mod report;

pub use benchmark::{Benchmark, MESH_NAME};
pub use block_slicer::{BlockSlicer, OneDimensionalBlockSlicer};
pub use dataset_filler::{
    DatasetFiller, DatasetFillerProvider, RandomDatasetFiller, SimpleDatasetFillerProvider,
};
pub use error::{Error, Result};
pub use report::{BenchmarkConfig, BenchmarkReport};
