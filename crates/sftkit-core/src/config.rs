//! Configuration types for sftkit.

use crate::{Result, SftError, DEFAULT_IGNORE_INDEX};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sequence construction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftConfig {
    /// Replace prompt labels with `ignore_index`.
    #[serde(default = "default_true")]
    pub mask_prompt: bool,

    /// Label value excluded from the loss.
    #[serde(default = "default_ignore_index")]
    pub ignore_index: i64,

    /// Maximum sequence length (None for no truncation).
    #[serde(default)]
    pub max_seq_length: Option<usize>,
}

impl Default for SftConfig {
    fn default() -> Self {
        Self {
            mask_prompt: true,
            ignore_index: default_ignore_index(),
            max_seq_length: None,
        }
    }
}

/// Batch collation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateConfig {
    /// Padding token ID for `input_ids`.
    #[serde(default)]
    pub pad_id: u32,

    /// Padding value for `labels`.
    #[serde(default = "default_ignore_index")]
    pub ignore_index: i64,

    /// Token written at the end of truncated rows.
    #[serde(default = "default_eos_id")]
    pub eos_id: u32,

    /// Row length cap (None for the longest sample).
    #[serde(default)]
    pub max_seq_length: Option<usize>,
}

impl Default for CollateConfig {
    fn default() -> Self {
        Self {
            pad_id: 0,
            ignore_index: default_ignore_index(),
            eos_id: default_eos_id(),
            max_seq_length: None,
        }
    }
}

/// DataLoader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLoaderConfig {
    /// Batch size.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Whether to shuffle the data.
    #[serde(default = "default_true")]
    pub shuffle: bool,

    /// Random seed for shuffling.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Whether to drop the last incomplete batch.
    #[serde(default)]
    pub drop_last: bool,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            shuffle: true,
            seed: default_seed(),
            drop_last: false,
        }
    }
}

/// Combined configuration for a data pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftRunConfig {
    /// Sequence construction settings.
    #[serde(default)]
    pub sft: SftConfig,

    /// Collation settings.
    #[serde(default)]
    pub collate: CollateConfig,

    /// DataLoader settings.
    #[serde(default)]
    pub loader: DataLoaderConfig,
}

impl SftRunConfig {
    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if self.loader.batch_size == 0 {
            return Err(SftError::Config("batch_size must be at least 1".into()));
        }
        if self.sft.max_seq_length == Some(0) || self.collate.max_seq_length == Some(0) {
            return Err(SftError::Config("max_seq_length must be at least 1".into()));
        }
        // The collator recognizes masked labels by this value.
        if self.sft.ignore_index != self.collate.ignore_index {
            return Err(SftError::Config(format!(
                "sft.ignore_index ({}) and collate.ignore_index ({}) must match",
                self.sft.ignore_index, self.collate.ignore_index
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_ignore_index() -> i64 {
    DEFAULT_IGNORE_INDEX
}
fn default_eos_id() -> u32 {
    2
}
fn default_batch_size() -> usize {
    4
}
fn default_seed() -> u64 {
    42
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SftRunConfig::default();
        assert!(config.sft.mask_prompt);
        assert_eq!(config.sft.ignore_index, -100);
        assert_eq!(config.collate.pad_id, 0);
        assert_eq!(config.collate.eos_id, 2);
        assert_eq!(config.loader.batch_size, 4);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "sft:\n  mask_prompt: false\n  max_seq_length: 512\ncollate:\n  pad_id: 100\n";
        let config = SftRunConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.sft.mask_prompt);
        assert_eq!(config.sft.max_seq_length, Some(512));
        assert_eq!(config.sft.ignore_index, -100);
        assert_eq!(config.collate.pad_id, 100);
        assert_eq!(config.loader, DataLoaderConfig::default());
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let result = SftRunConfig::from_yaml_str("loader:\n  batch_size: 0\n");
        assert!(matches!(result, Err(SftError::Config(_))));
    }

    #[test]
    fn test_rejects_mismatched_ignore_index() {
        let yaml = "sft:\n  ignore_index: -1\ncollate:\n  max_seq_length: 5\n";
        let err = SftRunConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SftError::Config(_)));
        assert!(err.to_string().contains("ignore_index"), "{err}");

        let yaml = "sft:\n  ignore_index: -1\ncollate:\n  ignore_index: -1\n  max_seq_length: 5\n";
        let config = SftRunConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.collate.ignore_index, -1);
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let result = SftRunConfig::from_yaml_str("sft: [");
        assert!(matches!(result, Err(SftError::Serialization(_))));
    }
}
