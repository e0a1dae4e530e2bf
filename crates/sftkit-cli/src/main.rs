//! sftkit CLI - inspect SFT examples and collated batches.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sftkit_core::{CollateConfig, SftRunConfig};
use sftkit_data::{
    load_examples_jsonl, BuiltinPromptStyle, SftCollator, SftDataLoader, SftDataset, SftTokenizer,
    Tokenizer,
};

#[derive(Parser)]
#[command(name = "sftkit")]
#[command(author, version, about = "Build and batch supervised fine-tuning data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct DataArgs {
    /// Path to a HuggingFace tokenizer.json
    #[arg(short, long)]
    tokenizer: PathBuf,

    /// Dataset path (JSONL with instruction/input/output)
    #[arg(short, long)]
    data: PathBuf,

    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prompt style: alpaca or passthrough
    #[arg(long, default_value = "alpaca")]
    style: BuiltinPromptStyle,

    /// Keep prompt tokens in the labels
    #[arg(long)]
    no_mask_prompt: bool,

    /// Maximum sequence length (overrides the config file)
    #[arg(long)]
    max_seq_length: Option<usize>,

    /// Override the tokenizer's end-of-sequence ID
    #[arg(long)]
    eos_id: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the encoded input_ids and labels of one example
    Inspect {
        #[command(flatten)]
        data: DataArgs,

        /// Example index
        #[arg(short, long, default_value = "0")]
        index: usize,
    },

    /// Collate the whole dataset and print every batch shape
    Batches {
        #[command(flatten)]
        data: DataArgs,

        /// Batch size (overrides the config file)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Disable shuffling
        #[arg(long)]
        no_shuffle: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { data, index } => {
            let (dataset, _) = build_dataset(&data)?;
            let encoded = dataset
                .get(index)
                .with_context(|| format!("Failed to encode example {index}"))?;

            println!("length:    {}", encoded.len());
            println!("input_ids: {:?}", encoded.input_ids);
            println!("labels:    {:?}", encoded.labels);
            if let Ok(text) = dataset.tokenizer().decode(&encoded.input_ids) {
                println!("decoded:   {text:?}");
            }
        }
        Commands::Batches {
            data,
            batch_size,
            no_shuffle,
        } => {
            let (dataset, mut config) = build_dataset(&data)?;
            if let Some(batch_size) = batch_size {
                config.loader.batch_size = batch_size;
            }
            if no_shuffle {
                config.loader.shuffle = false;
            }
            config.validate()?;

            let collator = SftCollator::new(CollateConfig {
                eos_id: dataset.tokenizer().eos_id(),
                ..config.collate.clone()
            });

            let loader = SftDataLoader::new(dataset, collator, config.loader);
            let mut total = 0;
            for (i, batch) in loader.enumerate() {
                let batch = batch.with_context(|| format!("Failed to build batch {i}"))?;
                let (rows, cols) = batch.shape();
                total += rows;
                println!("batch {i:>4}: {rows} x {cols}");
            }
            println!("{total} examples");
        }
    }

    Ok(())
}

type CliDataset = SftDataset<Tokenizer, BuiltinPromptStyle>;

fn build_dataset(args: &DataArgs) -> anyhow::Result<(CliDataset, SftRunConfig)> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_mask_prompt {
        config.sft.mask_prompt = false;
    }
    if args.max_seq_length.is_some() {
        config.sft.max_seq_length = args.max_seq_length;
        config.collate.max_seq_length = args.max_seq_length;
    }
    config.validate()?;

    let mut tokenizer = Tokenizer::from_file(&args.tokenizer).with_context(|| {
        format!("Failed to load tokenizer from {}", args.tokenizer.display())
    })?;
    if let Some(eos_id) = args.eos_id {
        tokenizer = tokenizer.with_eos_id(eos_id);
    }

    let examples = load_examples_jsonl(&args.data)?;
    let dataset = SftDataset::new(examples, tokenizer, args.style, config.sft.clone());
    Ok((dataset, config))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SftRunConfig> {
    match path {
        Some(path) => SftRunConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SftRunConfig::default()),
    }
}
