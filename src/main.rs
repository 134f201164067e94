//! Command-line classifier
//!
//! Classifies one text file and prints its legal context and subcategory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use legal_classifier::classifier::{provider_from_config, Classifier, ClassifyError};
use legal_classifier::utils::init_logging;
use legal_classifier::{AppConfig, Taxonomy};

/// Classify a TXT file into a legal context and subcategory.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TXT file to classify
    txt_file: PathBuf,

    /// Model identifier (overrides CLASSIFIER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Taxonomy definitions file (overrides CLASSIFIER_DEFINITIONS)
    #[arg(long)]
    definitions: Option<PathBuf>,

    /// Reject subcategories that are not listed for the chosen category
    #[arg(long)]
    strict: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_logging("warn");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(path) = cli.definitions {
        config.definitions_path = path;
    }
    config.strict_subcategory |= cli.strict;

    let taxonomy = Taxonomy::load(&config.definitions_path)
        .context("Failed to load taxonomy definitions")?;

    let text = match std::fs::read_to_string(&cli.txt_file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading '{}': {}", cli.txt_file.display(), e);
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!(path = %cli.txt_file.display(), bytes = text.len(), "Input read");

    let provider = provider_from_config(&config)?;
    let classifier = Classifier::new(Arc::new(taxonomy), provider)
        .with_model(config.model.clone())
        .with_strict_subcategory(config.strict_subcategory);

    match classifier.classify(&text).await {
        Ok(result) => {
            println!("Category   : {}", result.category);
            println!("Subcategory: {}", result.subcategory);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ (ClassifyError::SchemaValidation { .. } | ClassifyError::UnlistedSubcategory { .. })) => {
            eprintln!("warning: Failed to validate LLM response: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
