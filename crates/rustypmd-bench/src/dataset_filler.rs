//! Producers of the data written by the benchmark.

use std::marker::PhantomData;

use rand::distributions::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Items generated from one rng. Larger requests are split into blocks of
/// this size, generated in parallel with the `parallel` feature.
pub const BLOCK_ITEMS: usize = 1 << 16;

/// Produces the data of one block per call.
pub trait DatasetFiller<T> {
    fn produce_data(&mut self) -> Vec<T>;

    fn set_number_of_items(&mut self, number_of_items: u64);

    fn number_of_items(&self) -> u64;
}

/// Hands out a filler for each benchmark configuration.
pub trait DatasetFillerProvider {
    type Item;
    type Filler: DatasetFiller<Self::Item>;

    fn provide(&self) -> Self::Filler;
}

/// Draws values from a `rand` distribution.
///
/// Output depends only on the seed, the number of items and the number of
/// earlier calls, never on the thread count: block `b` of call `c` uses its
/// own rng seeded from `(seed, c, b)`.
#[derive(Debug, Clone)]
pub struct RandomDatasetFiller<T, D> {
    distribution: D,
    seed: u64,
    calls: u64,
    number_of_items: u64,
    buffered: Option<Vec<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, D> RandomDatasetFiller<T, D>
where
    T: Default + Clone + Send,
    D: Distribution<T> + Sync,
{
    pub fn new(distribution: D, number_of_items: u64) -> Self {
        Self {
            distribution,
            seed: 0,
            calls: 0,
            number_of_items,
            buffered: None,
            _marker: PhantomData,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.calls = 0;
        self
    }

    pub fn with_random_seed(self) -> Self {
        let seed = rand::thread_rng().gen();
        self.with_seed(seed)
    }

    /// Generate once and hand out the same data on every call.
    pub fn buffer_mode(&mut self) -> &mut Self {
        if self.buffered.is_none() {
            self.buffered = Some(self.generate());
        }
        self
    }

    pub fn is_buffered(&self) -> bool {
        self.buffered.is_some()
    }

    fn generate(&mut self) -> Vec<T> {
        let call = self.calls;
        self.calls += 1;
        let seed = self.seed;
        let distribution = &self.distribution;
        let mut data = vec![T::default(); self.number_of_items as usize];

        let fill = |(block, chunk): (usize, &mut [T])| {
            let mut rng = SmallRng::seed_from_u64(block_seed(seed, call, block as u64));
            for value in chunk.iter_mut() {
                *value = distribution.sample(&mut rng);
            }
        };
        #[cfg(feature = "parallel")]
        data.par_chunks_mut(BLOCK_ITEMS).enumerate().for_each(fill);
        #[cfg(not(feature = "parallel"))]
        data.chunks_mut(BLOCK_ITEMS).enumerate().for_each(fill);

        log::debug!("generated {} items (call {call})", data.len());
        data
    }
}

impl<T, D> DatasetFiller<T> for RandomDatasetFiller<T, D>
where
    T: Default + Clone + Send,
    D: Distribution<T> + Sync,
{
    fn produce_data(&mut self) -> Vec<T> {
        match &self.buffered {
            Some(data) => data.clone(),
            None => self.generate(),
        }
    }

    fn set_number_of_items(&mut self, number_of_items: u64) {
        self.number_of_items = number_of_items;
        if self.buffered.is_some() {
            self.buffered = Some(self.generate());
        }
    }

    fn number_of_items(&self) -> u64 {
        self.number_of_items
    }
}

/// splitmix64 finalizer over the seed, call and block index.
fn block_seed(seed: u64, call: u64, block: u64) -> u64 {
    let mut z = seed
        .wrapping_add(call.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(block.wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Provides clones of one configured filler.
#[derive(Debug, Clone)]
pub struct SimpleDatasetFillerProvider<F> {
    filler: F,
}

impl<F> SimpleDatasetFillerProvider<F> {
    pub fn new(filler: F) -> Self {
        Self { filler }
    }
}

impl<T, D> DatasetFillerProvider for SimpleDatasetFillerProvider<RandomDatasetFiller<T, D>>
where
    T: Default + Clone + Send,
    D: Distribution<T> + Sync + Clone,
{
    type Item = T;
    type Filler = RandomDatasetFiller<T, D>;

    fn provide(&self) -> Self::Filler {
        self.filler.clone()
    }
}
