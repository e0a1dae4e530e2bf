//! Prompt styles for instruction formatting.
//!
//! A prompt style turns an instruction (plus the rest of its record as
//! context) into the prompt text that precedes the response. The text it
//! returns is the span masked from the loss when prompt masking is enabled.

use sftkit_core::{Example, SftError};
use std::str::FromStr;

/// Formats an instruction into prompt text.
pub trait PromptStyle {
    /// Build the prompt for `instruction`; `example` carries extra context.
    fn apply(&self, instruction: &str, example: &Example) -> String;
}

impl<F> PromptStyle for F
where
    F: Fn(&str, &Example) -> String,
{
    fn apply(&self, instruction: &str, example: &Example) -> String {
        self(instruction, example)
    }
}

/// Uses the instruction verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl PromptStyle for Passthrough {
    fn apply(&self, instruction: &str, _example: &Example) -> String {
        instruction.to_string()
    }
}

/// Alpaca format: ### Instruction:\n...\n\n### Response:\n
#[derive(Debug, Clone, Copy, Default)]
pub struct Alpaca;

impl PromptStyle for Alpaca {
    fn apply(&self, instruction: &str, example: &Example) -> String {
        if example.input.is_empty() {
            format!(
                "Below is an instruction that describes a task. \
                 Write a response that appropriately completes the request.\n\n\
                 ### Instruction:\n{instruction}\n\n### Response:\n"
            )
        } else {
            format!(
                "Below is an instruction that describes a task, paired with an input that \
                 provides further context. Write a response that appropriately completes \
                 the request.\n\n### Instruction:\n{instruction}\n\n### Input:\n{}\n\n\
                 ### Response:\n",
                example.input
            )
        }
    }
}

/// Built-in prompt styles selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuiltinPromptStyle {
    /// See [`Passthrough`].
    Passthrough,
    /// See [`Alpaca`].
    #[default]
    Alpaca,
}

impl PromptStyle for BuiltinPromptStyle {
    fn apply(&self, instruction: &str, example: &Example) -> String {
        match self {
            Self::Passthrough => Passthrough.apply(instruction, example),
            Self::Alpaca => Alpaca.apply(instruction, example),
        }
    }
}

impl FromStr for BuiltinPromptStyle {
    type Err = SftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passthrough" | "default" => Ok(Self::Passthrough),
            "alpaca" => Ok(Self::Alpaca),
            other => Err(SftError::InvalidArgument(format!(
                "unknown prompt style '{other}' (expected 'alpaca' or 'passthrough')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let ex = Example::new("Foo", "Bar");
        assert_eq!(Passthrough.apply("Foo", &ex), "Foo");
    }

    #[test]
    fn test_alpaca_without_input() {
        let ex = Example::new("Say hello", "Hello!");
        let prompt = Alpaca.apply(&ex.instruction, &ex);
        assert!(prompt.starts_with("Below is an instruction that describes a task. Write"));
        assert!(prompt.ends_with("### Instruction:\nSay hello\n\n### Response:\n"));
        assert!(!prompt.contains("### Input:"));
    }

    #[test]
    fn test_alpaca_with_input() {
        let ex = Example::new("Translate", "Bonjour").with_input("Hello");
        let prompt = Alpaca.apply(&ex.instruction, &ex);
        assert!(prompt.contains("paired with an input that provides further context"));
        assert!(prompt.ends_with("### Instruction:\nTranslate\n\n### Input:\nHello\n\n### Response:\n"));
    }

    #[test]
    fn test_closure_style() {
        let style = |p: &str, _: &Example| format!("In: {p} Out:");
        assert_eq!(style.apply("Foo", &Example::new("Foo", "Bar")), "In: Foo Out:");
    }

    #[test]
    fn test_builtin_from_str() {
        assert_eq!(
            "Alpaca".parse::<BuiltinPromptStyle>().unwrap(),
            BuiltinPromptStyle::Alpaca
        );
        assert_eq!(
            "passthrough".parse::<BuiltinPromptStyle>().unwrap(),
            BuiltinPromptStyle::Passthrough
        );
        assert!("llama9".parse::<BuiltinPromptStyle>().is_err());
    }
}
