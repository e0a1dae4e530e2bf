//! Dataset construction and batching for supervised fine-tuning.
//!
//! This crate provides:
//! - Prompt formatting and tokenization of instruction/response pairs
//! - Prompt masking of labels and EOS-preserving truncation
//! - Padding/truncating collation into rectangular batches
//! - A DataLoader that yields collated batches
//! - Tokenizer integration and JSONL loading

#![warn(missing_docs)]

pub mod collator;
pub mod dataloader;
pub mod dataset;
pub mod prompt;
pub mod tokenizer;

#[cfg(test)]
mod test_util;

pub use collator::*;
pub use dataloader::*;
pub use dataset::*;
pub use prompt::*;
pub use tokenizer::*;
