//! Browser front end: upload text or PDF files and classify each one.

use anyhow::{Context, Result};
use std::sync::Arc;

use legal_classifier::classifier::{provider_from_config, Classifier};
use legal_classifier::server::{run_server, AppState};
use legal_classifier::utils::init_logging;
use legal_classifier::{AppConfig, Taxonomy};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging("legal_classifier=info,tower_http=info");

    let config = AppConfig::from_env()?;
    let taxonomy = Taxonomy::load(&config.definitions_path)
        .with_context(|| format!("Failed to load taxonomy from {}", config.definitions_path.display()))?;

    let provider = provider_from_config(&config)?;
    let classifier = Classifier::new(Arc::new(taxonomy), provider)
        .with_model(config.model.clone())
        .with_strict_subcategory(config.strict_subcategory);

    let state = AppState::new(Arc::new(classifier), &config);
    run_server(state, &config.bind).await
}
