//! Shared fixtures for unit tests.

use crate::SftTokenizer;
use sftkit_core::Result;

/// One id per byte, bos = 1, eos = 2.
pub(crate) struct ByteTokenizer;

impl SftTokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(std::iter::once(1)
            .chain(text.bytes().map(u32::from))
            .collect())
    }

    fn bos_id(&self) -> Option<u32> {
        Some(1)
    }

    fn eos_id(&self) -> u32 {
        2
    }
}
