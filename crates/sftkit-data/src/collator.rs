//! Data collation utilities.

use sftkit_core::{Batch, CollateConfig, EncodedExample, Result, SftError};

/// Truncate paired sequences to `max_len`, ending the inputs with `eos_id`.
///
/// Only acts when the sequences are longer than `max_len`. The last label is
/// set to `eos_id` as well unless it holds `ignore_index`.
///
/// Returns whether anything was cut.
pub fn truncate_with_eos(
    input_ids: &mut Vec<u32>,
    labels: &mut Vec<i64>,
    max_len: usize,
    eos_id: u32,
    ignore_index: i64,
) -> bool {
    if input_ids.len() <= max_len {
        return false;
    }
    input_ids.truncate(max_len);
    labels.truncate(max_len);

    if let Some(last) = input_ids.last_mut() {
        *last = eos_id;
    }
    if let Some(last) = labels.last_mut() {
        if *last != ignore_index {
            *last = i64::from(eos_id);
        }
    }
    true
}

/// Data collator for creating SFT batches.
///
/// Rows are right-padded to the longest sample (or to `max_seq_length` when
/// it is smaller): inputs with `pad_id`, labels with `ignore_index`.
#[derive(Debug, Clone, Default)]
pub struct SftCollator {
    config: CollateConfig,
}

impl SftCollator {
    /// Create a new data collator.
    pub fn new(config: CollateConfig) -> Self {
        Self { config }
    }

    /// Collator with the given padding values and no length cap.
    pub fn with_padding(pad_id: u32, ignore_index: i64) -> Self {
        Self::new(CollateConfig {
            pad_id,
            ignore_index,
            ..CollateConfig::default()
        })
    }

    /// Cap row length.
    #[must_use]
    pub fn with_max_seq_length(mut self, max_seq_length: Option<usize>) -> Self {
        self.config.max_seq_length = max_seq_length;
        self
    }

    /// Set the token forced at the end of truncated rows.
    #[must_use]
    pub fn with_eos_id(mut self, eos_id: u32) -> Self {
        self.config.eos_id = eos_id;
        self
    }

    /// Collation settings.
    pub fn config(&self) -> &CollateConfig {
        &self.config
    }

    /// Row length a batch of `samples` would have.
    pub fn target_len(&self, samples: &[EncodedExample]) -> usize {
        let longest = samples.iter().map(EncodedExample::len).max().unwrap_or(0);
        match self.config.max_seq_length {
            Some(cap) => longest.min(cap),
            None => longest,
        }
    }

    /// Collate samples into a batch of shape `(samples.len(), target_len)`.
    pub fn collate(&self, samples: &[EncodedExample]) -> Result<Batch> {
        let seq_len = self.target_len(samples);
        let mut input_ids = Vec::with_capacity(samples.len());
        let mut labels = Vec::with_capacity(samples.len());

        for (i, sample) in samples.iter().enumerate() {
            if sample.input_ids.len() != sample.labels.len() {
                return Err(SftError::ShapeMismatch {
                    expected: vec![i, sample.input_ids.len()],
                    actual: vec![i, sample.labels.len()],
                });
            }

            let mut row_ids = sample.input_ids.clone();
            let mut row_labels = sample.labels.clone();

            if !truncate_with_eos(
                &mut row_ids,
                &mut row_labels,
                seq_len,
                self.config.eos_id,
                self.config.ignore_index,
            ) {
                row_ids.resize(seq_len, self.config.pad_id);
                row_labels.resize(seq_len, self.config.ignore_index);
            }

            input_ids.push(row_ids);
            labels.push(row_labels);
        }

        Ok(Batch { input_ids, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<EncodedExample> {
        vec![
            EncodedExample::new(vec![1, 2, 3], vec![10, 20, 30]),
            EncodedExample::new(vec![4, 5, 6, 7, 8], vec![40, 50, 60, 70, 80]),
        ]
    }

    #[test]
    fn test_padding() {
        for pad_id in [0, 100] {
            for ignore_index in [-1, -100] {
                let batch = SftCollator::with_padding(pad_id, ignore_index)
                    .collate(&samples())
                    .unwrap();
                assert_eq!(
                    batch.input_ids,
                    vec![vec![1, 2, 3, pad_id, pad_id], vec![4, 5, 6, 7, 8]]
                );
                assert_eq!(
                    batch.labels,
                    vec![
                        vec![10, 20, 30, ignore_index, ignore_index],
                        vec![40, 50, 60, 70, 80]
                    ]
                );
            }
        }
    }

    #[test]
    fn test_truncation_forces_eos() {
        let batch = SftCollator::default()
            .with_max_seq_length(Some(2))
            .collate(&samples())
            .unwrap();
        assert_eq!(batch.input_ids, vec![vec![1, 2], vec![4, 2]]);
        assert_eq!(batch.labels, vec![vec![10, 2], vec![40, 2]]);
        assert_eq!(batch.shape(), (2, 2));
    }

    #[test]
    fn test_truncation_keeps_masked_label() {
        let sample = EncodedExample::new(vec![1, 2, 3, 4], vec![-100, -100, -100, 4]);
        let batch = SftCollator::default()
            .with_max_seq_length(Some(3))
            .collate(&[sample])
            .unwrap();
        assert_eq!(batch.input_ids, vec![vec![1, 2, 2]]);
        assert_eq!(batch.labels, vec![vec![-100, -100, -100]]);
    }

    #[test]
    fn test_cap_larger_than_longest() {
        let batch = SftCollator::default()
            .with_max_seq_length(Some(100))
            .collate(&samples())
            .unwrap();
        assert_eq!(batch.shape(), (2, 5));
        assert_eq!(batch.input_ids[1], vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_cap_equal_to_longest_leaves_row_untouched() {
        let batch = SftCollator::default()
            .with_max_seq_length(Some(5))
            .collate(&samples())
            .unwrap();
        assert_eq!(batch.shape(), (2, 5));
        assert_eq!(batch.input_ids[1], vec![4, 5, 6, 7, 8]);
        assert_eq!(batch.labels[1], vec![40, 50, 60, 70, 80]);
    }

    #[test]
    fn test_custom_eos() {
        let batch = SftCollator::default()
            .with_max_seq_length(Some(4))
            .with_eos_id(99)
            .collate(&samples())
            .unwrap();
        assert_eq!(batch.input_ids[0], vec![1, 2, 3, 0]);
        assert_eq!(batch.input_ids[1], vec![4, 5, 6, 99]);
        assert_eq!(batch.labels[1], vec![40, 50, 60, 99]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = SftCollator::default().collate(&[]).unwrap();
        assert_eq!(batch.shape(), (0, 0));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let sample = EncodedExample::new(vec![1, 2, 3], vec![1, 2]);
        let result = SftCollator::default().collate(&[sample]);
        assert!(matches!(result, Err(SftError::ShapeMismatch { .. })));
    }
}
