//! Write/read throughput of a series, with ranks simulated in one process.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustypmd::{Access, Dataset, Element, Extent, Offset, Series};
use rustypmd_format::num_elements;

use crate::block_slicer::BlockSlicer;
use crate::dataset_filler::{DatasetFiller, DatasetFillerProvider};
use crate::error::{Error, Result};
use crate::report::{BenchmarkConfig, BenchmarkReport};

/// Name of the mesh written in every iteration.
pub const MESH_NAME: &str = "id";

/// Writes the scalar mesh [`MESH_NAME`] of `total_extent` in every iteration,
/// each simulated rank storing the block its slicer assigns, then reads the
/// blocks back.
///
/// Only series calls and flushes are timed, data generation is not.
#[derive(Debug)]
pub struct Benchmark<S, P> {
    base_path: PathBuf,
    total_extent: Extent,
    slicer: S,
    provider: P,
    configurations: Vec<BenchmarkConfig>,
}

impl<S, P> Benchmark<S, P>
where
    S: BlockSlicer,
    P: DatasetFillerProvider,
    P::Item: Element,
{
    /// `base_path` gets the backend extension appended, e.g.
    /// `out/bench` becomes `out/bench.json`.
    pub fn new(base_path: impl Into<PathBuf>, total_extent: Extent, slicer: S, provider: P) -> Self {
        Self {
            base_path: base_path.into(),
            total_extent,
            slicer,
            provider,
            configurations: Vec::new(),
        }
    }

    /// Queue a configuration. An empty `compression` writes uncompressed.
    pub fn add_configuration(
        &mut self,
        compression: &str,
        compression_level: u8,
        backend: &str,
        ranks: usize,
        iterations: u64,
    ) -> &mut Self {
        self.configurations.push(BenchmarkConfig {
            compression: compression.to_string(),
            compression_level,
            backend: backend.to_string(),
            ranks,
            dtype: <P::Item as Element>::DATATYPE,
            iterations,
        });
        self
    }

    pub fn reset_configurations(&mut self) {
        self.configurations.clear();
    }

    pub fn configurations(&self) -> &[BenchmarkConfig] {
        &self.configurations
    }

    /// Series file of a configuration.
    pub fn path_for(&self, config: &BenchmarkConfig) -> PathBuf {
        let mut name = self.base_path.clone().into_os_string();
        name.push(".");
        name.push(&config.backend);
        PathBuf::from(name)
    }

    /// Run every configuration in order.
    pub fn run(&self) -> Result<BenchmarkReport> {
        if self.total_extent.is_empty() {
            return Err(Error::InvalidConfig("total extent must be at least 1D".to_string()));
        }
        let mut report = BenchmarkReport::new();
        for config in &self.configurations {
            if config.ranks == 0 {
                return Err(Error::InvalidConfig(format!(
                    "configuration for backend '{}' has no ranks",
                    config.backend
                )));
            }
            let blocks: Vec<(Offset, Extent)> = (0..config.ranks)
                .map(|rank| self.slicer.slice_block(&self.total_extent, config.ranks, rank))
                .filter(|(_, extent)| num_elements(extent) > 0)
                .collect();
            let path = self.path_for(config);

            let mut filler = self.provider.provide();
            let write = self.write_phase(config, &path, &blocks, &mut filler)?;
            let read = self.read_phase(config, &path, &blocks)?;
            log::info!(
                "{} ({} ranks, {} iterations): write {:.3}s, read {:.3}s",
                path.display(),
                config.ranks,
                config.iterations,
                write.as_secs_f64(),
                read.as_secs_f64()
            );
            report.add_report(config.clone(), write, read);
        }
        Ok(report)
    }

    fn write_phase(
        &self,
        config: &BenchmarkConfig,
        path: &Path,
        blocks: &[(Offset, Extent)],
        filler: &mut P::Filler,
    ) -> Result<Duration> {
        let mut dataset = Dataset::new(<P::Item as Element>::DATATYPE, self.total_extent.clone());
        if !config.compression.is_empty() {
            dataset.set_compression(&config.compression, config.compression_level)?;
        }

        let start = Instant::now();
        let mut series = Series::new(path, Access::Create)?;
        let mut elapsed = start.elapsed();

        for index in 0..config.iterations {
            let data: Vec<Vec<P::Item>> = blocks
                .iter()
                .map(|(_, extent)| {
                    filler.set_number_of_items(num_elements(extent));
                    filler.produce_data()
                })
                .collect();

            let start = Instant::now();
            let id = series
                .iterations
                .get_or_create(index)?
                .meshes
                .get_or_create(MESH_NAME)?
                .scalar_mut()?;
            id.reset_dataset(dataset.clone())?;
            for ((offset, extent), chunk) in blocks.iter().zip(data) {
                id.store_chunk(chunk, offset.clone(), extent.clone())?;
            }
            series.flush()?;
            elapsed += start.elapsed();
        }

        let start = Instant::now();
        drop(series);
        Ok(elapsed + start.elapsed())
    }

    fn read_phase(&self, config: &BenchmarkConfig, path: &Path, blocks: &[(Offset, Extent)]) -> Result<Duration> {
        let start = Instant::now();
        let mut series = Series::new(path, Access::ReadOnly)?;
        for index in 0..config.iterations {
            let id = series
                .iterations
                .get_mut(&index)
                .and_then(|iteration| iteration.meshes.get_mut(MESH_NAME))
                .ok_or_else(|| {
                    rustypmd::Error::ReadError(format!(
                        "{}: iteration {index} has no mesh '{MESH_NAME}'",
                        path.display()
                    ))
                })?
                .scalar_mut()?;
            for (offset, extent) in blocks {
                let chunk: Vec<P::Item> = id.load_chunk(offset.clone(), extent.clone())?;
                debug_assert_eq!(chunk.len() as u64, num_elements(extent));
            }
        }
        drop(series);
        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_slicer::OneDimensionalBlockSlicer;
    use crate::dataset_filler::{RandomDatasetFiller, SimpleDatasetFillerProvider};
    use rand::distributions::Uniform;

    type Provider = SimpleDatasetFillerProvider<RandomDatasetFiller<f64, Uniform<f64>>>;

    fn benchmark(base: &str) -> Benchmark<OneDimensionalBlockSlicer, Provider> {
        let filler = RandomDatasetFiller::new(Uniform::new(0.0, 1.0), 0).with_seed(7);
        Benchmark::new(
            base,
            vec![10, 4],
            OneDimensionalBlockSlicer::new(0),
            SimpleDatasetFillerProvider::new(filler),
        )
    }

    #[test]
    fn configurations_carry_item_type() {
        let mut b = benchmark("out/bench");
        b.add_configuration("", 0, "json", 3, 2)
            .add_configuration("zlib", 4, "toml", 1, 1);
        assert_eq!(b.configurations().len(), 2);
        assert_eq!(b.configurations()[0].dtype, rustypmd::Datatype::Double);
        assert_eq!(b.path_for(&b.configurations()[1]), PathBuf::from("out/bench.toml"));
        b.reset_configurations();
        assert!(b.configurations().is_empty());
    }

    #[test]
    fn rejects_empty_setups() {
        let mut b = benchmark("unused");
        b.add_configuration("", 0, "json", 0, 1);
        assert!(matches!(b.run(), Err(Error::InvalidConfig(_))));

        let filler = RandomDatasetFiller::new(Uniform::new(0.0f64, 1.0), 0);
        let b = Benchmark::new(
            "unused",
            vec![],
            OneDimensionalBlockSlicer::new(0),
            SimpleDatasetFillerProvider::new(filler),
        );
        assert!(matches!(b.run(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn no_configurations_no_report() {
        assert!(benchmark("unused").run().unwrap().is_empty());
    }
}
