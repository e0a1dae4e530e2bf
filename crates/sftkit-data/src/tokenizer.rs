//! Tokenizer integration.

use sftkit_core::{Result, SftError};
use std::path::Path;
use std::sync::Arc;

/// Tokenizer contract consumed by the sequence builder.
///
/// `encode` returns ids prefixed with `bos_id()` when the tokenizer has one.
/// The end-of-sequence id is appended by the caller, never by `encode`.
pub trait SftTokenizer {
    /// Encode text to token IDs, beginning-of-sequence id first.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Beginning-of-sequence token ID, if the vocabulary defines one.
    fn bos_id(&self) -> Option<u32>;

    /// End-of-sequence token ID.
    fn eos_id(&self) -> u32;
}

impl<T: SftTokenizer + ?Sized> SftTokenizer for &T {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        (**self).encode(text)
    }

    fn bos_id(&self) -> Option<u32> {
        (**self).bos_id()
    }

    fn eos_id(&self) -> u32 {
        (**self).eos_id()
    }
}

impl<T: SftTokenizer + ?Sized> SftTokenizer for Arc<T> {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        (**self).encode(text)
    }

    fn bos_id(&self) -> Option<u32> {
        (**self).bos_id()
    }

    fn eos_id(&self) -> u32 {
        (**self).eos_id()
    }
}

/// Wrapper around the tokenizers library.
pub struct Tokenizer {
    inner: tokenizers::Tokenizer,
    bos_id: Option<u32>,
    eos_id: u32,
}

impl Tokenizer {
    /// Load a tokenizer from a local `tokenizer.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| SftError::Tokenizer(e.to_string()))?;
        Self::from_inner(inner)
    }

    /// Load a tokenizer from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_bytes(bytes)
            .map_err(|e| SftError::Tokenizer(e.to_string()))?;
        Self::from_inner(inner)
    }

    /// Wrap an already constructed tokenizer.
    ///
    /// Fails when no end-of-sequence token can be found; use
    /// [`Tokenizer::from_inner_with_eos`] for vocabularies with unusual names.
    pub fn from_inner(inner: tokenizers::Tokenizer) -> Result<Self> {
        let eos_id = lookup_eos(&inner).ok_or_else(|| {
            SftError::Tokenizer("no end-of-sequence token found in vocabulary".into())
        })?;
        Ok(Self::from_inner_with_eos(inner, eos_id))
    }

    /// Wrap a tokenizer with an explicit end-of-sequence ID.
    pub fn from_inner_with_eos(inner: tokenizers::Tokenizer, eos_id: u32) -> Self {
        let bos_id = lookup_bos(&inner);
        Self {
            inner,
            bos_id,
            eos_id,
        }
    }

    /// Override the beginning-of-sequence ID (`None` disables the prefix).
    #[must_use]
    pub fn with_bos_id(mut self, bos_id: Option<u32>) -> Self {
        self.bos_id = bos_id;
        self
    }

    /// Override the end-of-sequence ID.
    #[must_use]
    pub fn with_eos_id(mut self, eos_id: u32) -> Self {
        self.eos_id = eos_id;
        self
    }

    /// Decode token IDs to text.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| SftError::Tokenizer(e.to_string()))
    }

    /// Get vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }

    /// Get the underlying tokenizer.
    pub fn inner(&self) -> &tokenizers::Tokenizer {
        &self.inner
    }
}

impl SftTokenizer for Tokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        // Special tokens are handled here, not by the post-processor.
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| SftError::Tokenizer(e.to_string()))?;
        let ids = encoding.get_ids();

        let mut out = Vec::with_capacity(ids.len() + 1);
        out.extend(self.bos_id);
        out.extend_from_slice(ids);
        Ok(out)
    }

    fn bos_id(&self) -> Option<u32> {
        self.bos_id
    }

    fn eos_id(&self) -> u32 {
        self.eos_id
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("vocab_size", &self.vocab_size())
            .field("bos_id", &self.bos_id)
            .field("eos_id", &self.eos_id)
            .finish()
    }
}

fn lookup_eos(inner: &tokenizers::Tokenizer) -> Option<u32> {
    inner
        .token_to_id("</s>")
        .or_else(|| inner.token_to_id("<|endoftext|>"))
        .or_else(|| inner.token_to_id("<|end_of_text|>"))
        .or_else(|| inner.token_to_id("<eos>"))
}

fn lookup_bos(inner: &tokenizers::Tokenizer) -> Option<u32> {
    inner
        .token_to_id("<s>")
        .or_else(|| inner.token_to_id("<|begin_of_text|>"))
        .or_else(|| inner.token_to_id("<bos>"))
}
