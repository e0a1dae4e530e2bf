//! Dataset types and loading.

use super::collator::truncate_with_eos;
use super::prompt::PromptStyle;
use super::tokenizer::SftTokenizer;
use sftkit_core::{EncodedExample, Example, Result, SftConfig, SftError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Per-example hook applied before prompt formatting.
pub type ExampleTransform = Arc<dyn Fn(Example) -> Example + Send + Sync>;

/// Tokenize one example into `input_ids` and prompt-masked `labels`.
///
/// The full text is `prompt + output` followed by a single EOS token. With
/// `mask_prompt`, the first `len(encode(prompt))` labels become
/// `ignore_index`. Sequences longer than `max_seq_length` are cut and end
/// with EOS (see [`truncate_with_eos`]).
pub fn encode_example<T, P>(
    example: &Example,
    tokenizer: &T,
    prompt_style: &P,
    config: &SftConfig,
) -> Result<EncodedExample>
where
    T: SftTokenizer + ?Sized,
    P: PromptStyle + ?Sized,
{
    let prompt = prompt_style.apply(&example.instruction, example);
    let encoded_prompt = tokenizer.encode(&prompt)?;

    let mut input_ids = tokenizer.encode(&format!("{prompt}{}", example.output))?;
    input_ids.push(tokenizer.eos_id());

    let mut labels: Vec<i64> = input_ids.iter().map(|&id| i64::from(id)).collect();
    if config.mask_prompt {
        let prompt_len = encoded_prompt.len().min(labels.len());
        labels[..prompt_len].fill(config.ignore_index);
    }

    if let Some(max_len) = config.max_seq_length {
        let full_len = input_ids.len();
        if truncate_with_eos(
            &mut input_ids,
            &mut labels,
            max_len,
            tokenizer.eos_id(),
            config.ignore_index,
        ) {
            tracing::debug!(full_len, max_len, "Truncated example");
        }
    }

    Ok(EncodedExample { input_ids, labels })
}

/// Supervised fine-tuning dataset.
///
/// Holds raw examples; each one is tokenized when it is read.
#[derive(Clone)]
pub struct SftDataset<T, P> {
    examples: Vec<Example>,
    tokenizer: T,
    prompt_style: P,
    config: SftConfig,
    transform: Option<ExampleTransform>,
}

impl<T: SftTokenizer, P: PromptStyle> SftDataset<T, P> {
    /// Create a new dataset.
    pub fn new(examples: Vec<Example>, tokenizer: T, prompt_style: P, config: SftConfig) -> Self {
        Self {
            examples,
            tokenizer,
            prompt_style,
            config,
            transform: None,
        }
    }

    /// Apply `transform` to every example before it is formatted.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Example) -> Example + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Get the number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Encode the example at `index`.
    pub fn get(&self, index: usize) -> Result<EncodedExample> {
        let example = self.examples.get(index).ok_or(SftError::IndexOutOfBounds {
            index,
            len: self.examples.len(),
        })?;

        match &self.transform {
            Some(transform) => {
                let example = transform(example.clone());
                encode_example(&example, &self.tokenizer, &self.prompt_style, &self.config)
            }
            None => encode_example(example, &self.tokenizer, &self.prompt_style, &self.config),
        }
    }

    /// Iterate over encoded examples in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<EncodedExample>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Raw examples.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Sequence construction settings.
    pub fn config(&self) -> &SftConfig {
        &self.config
    }

    /// The tokenizer.
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }
}

impl<T, P> std::fmt::Debug for SftDataset<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftDataset")
            .field("len", &self.examples.len())
            .field("config", &self.config)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Load Alpaca-style records from a JSONL file.
///
/// Each non-blank line must hold `instruction` and `output`; `input` is
/// optional.
pub fn load_examples_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<Example>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SftError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open dataset file {}: {}", path.display(), e),
        ))
    })?;

    let reader = BufReader::new(file);
    let mut examples = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| {
            SftError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read line {}: {}", line_num + 1, e),
            ))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let example: Example = serde_json::from_str(&line)
            .map_err(|e| SftError::Serialization(format!("Line {}: {}", line_num + 1, e)))?;
        examples.push(example);
    }

    tracing::info!(count = examples.len(), path = %path.display(), "Loaded examples");
    Ok(examples)
}
