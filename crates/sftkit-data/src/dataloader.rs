//! DataLoader for creating training batches.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use sftkit_core::{Batch, DataLoaderConfig, Result};

use super::{PromptStyle, SftCollator, SftDataset, SftTokenizer};

/// DataLoader that yields collated batches from an [`SftDataset`].
pub struct SftDataLoader<T, P> {
    /// The dataset.
    dataset: SftDataset<T, P>,
    /// Collator applied to every batch.
    collator: SftCollator,
    /// Configuration.
    config: DataLoaderConfig,
    /// Current index permutation.
    indices: Vec<usize>,
    /// Current position in the dataset.
    position: usize,
}

impl<T: SftTokenizer, P: PromptStyle> SftDataLoader<T, P> {
    /// Create a new DataLoader.
    pub fn new(dataset: SftDataset<T, P>, collator: SftCollator, config: DataLoaderConfig) -> Self {
        let n = dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();

        if config.shuffle {
            let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
            indices.shuffle(&mut rng);
        }

        tracing::info!(
            samples = n,
            batch_size = config.batch_size,
            shuffle = config.shuffle,
            "Created data loader"
        );

        Self {
            dataset,
            collator,
            config,
            indices,
            position: 0,
        }
    }

    /// Reset the DataLoader for a new epoch.
    ///
    /// Reshuffles from `new_seed`, or from the configured seed when `None`.
    pub fn reset(&mut self, new_seed: Option<u64>) {
        self.position = 0;
        if self.config.shuffle {
            let seed = new_seed.unwrap_or(self.config.seed);
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            self.indices = (0..self.dataset.len()).collect();
            self.indices.shuffle(&mut rng);
        }
    }

    /// Get the number of batches.
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        let batch_size = self.config.batch_size.max(1);
        if self.config.drop_last {
            n / batch_size
        } else {
            n.div_ceil(batch_size)
        }
    }

    /// Get the total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Check if the loader is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &SftDataset<T, P> {
        &self.dataset
    }

    /// Get the next batch.
    pub fn next_batch(&mut self) -> Option<Result<Batch>> {
        if self.position >= self.indices.len() {
            return None;
        }

        let batch_size = self.config.batch_size.max(1);
        let batch_end = (self.position + batch_size).min(self.indices.len());

        // Check if we should drop incomplete batch
        if self.config.drop_last && batch_end - self.position < batch_size {
            return None;
        }

        let range = self.position..batch_end;
        self.position = batch_end;
        Some(self.create_batch(range))
    }

    fn create_batch(&self, range: std::ops::Range<usize>) -> Result<Batch> {
        let samples = self.indices[range]
            .iter()
            .map(|&i| self.dataset.get(i))
            .collect::<Result<Vec<_>>>()?;
        self.collator.collate(&samples)
    }
}

impl<T: SftTokenizer, P: PromptStyle> Iterator for SftDataLoader<T, P> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}
