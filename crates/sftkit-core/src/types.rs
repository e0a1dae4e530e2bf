//! Common type definitions.

use serde::{Deserialize, Serialize};

/// Default label value excluded from the loss.
pub const DEFAULT_IGNORE_INDEX: i64 = -100;

/// A raw instruction/response record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// The instruction shown to the model.
    pub instruction: String,
    /// Optional additional context for the instruction.
    #[serde(default)]
    pub input: String,
    /// The expected response.
    pub output: String,
}

impl Example {
    /// Create an example without additional input.
    pub fn new(instruction: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            input: String::new(),
            output: output.into(),
        }
    }

    /// Attach additional input context.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }
}

/// A tokenized example ready for collation.
///
/// `input_ids` and `labels` always have the same length. Each label is either
/// the token at the same position or the ignore index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedExample {
    /// Input token IDs.
    pub input_ids: Vec<u32>,
    /// Labels for loss computation.
    pub labels: Vec<i64>,
}

impl EncodedExample {
    /// Create an encoded example from paired sequences.
    pub fn new(input_ids: Vec<u32>, labels: Vec<i64>) -> Self {
        Self { input_ids, labels }
    }

    /// Create an example whose labels mirror its inputs.
    pub fn unmasked(input_ids: Vec<u32>) -> Self {
        let labels = input_ids.iter().map(|&id| i64::from(id)).collect();
        Self { input_ids, labels }
    }

    /// Sequence length.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// A rectangular batch of encoded examples.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    /// Input token IDs [batch_size, seq_len].
    pub input_ids: Vec<Vec<u32>>,
    /// Labels [batch_size, seq_len].
    pub labels: Vec<Vec<i64>>,
}

impl Batch {
    /// Number of rows.
    pub fn batch_size(&self) -> usize {
        self.input_ids.len()
    }

    /// Row length (0 for an empty batch).
    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }

    /// Shape as `(batch_size, seq_len)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.batch_size(), self.seq_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_deserialize_without_input() {
        let ex: Example =
            serde_json::from_str(r#"{"instruction": "Foo", "output": "Bar"}"#).unwrap();
        assert_eq!(ex, Example::new("Foo", "Bar"));
        assert!(ex.input.is_empty());
    }

    #[test]
    fn test_unmasked_labels() {
        let ex = EncodedExample::unmasked(vec![1, 2, 3]);
        assert_eq!(ex.labels, vec![1, 2, 3]);
        assert_eq!(ex.len(), 3);
    }

    #[test]
    fn test_batch_shape() {
        let batch = Batch {
            input_ids: vec![vec![1, 2], vec![3, 4]],
            labels: vec![vec![1, 2], vec![3, 4]],
        };
        assert_eq!(batch.shape(), (2, 2));
        assert_eq!(Batch::default().shape(), (0, 0));
    }
}
