//! Classifier Module
//!
//! Builds the taxonomy-driven instruction, issues one structured-generation
//! request per document and validates the answer against the fixed schema.

mod prompt;
mod provider;
mod types;

pub use prompt::build_system_prompt;
pub use provider::{
    provider_from_config, LLMProvider, OpenAICompatibleProvider, ProviderError, ResponsesProvider,
    StructuredRequest,
};
pub use types::{Category, ClassificationResult, UnknownCategory};

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::taxonomy::Taxonomy;

pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";
const SCHEMA_NAME: &str = "ClassificationResult";

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("response does not match the classification schema: {source} (raw: {raw})")]
    SchemaValidation {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("subcategory `{subcategory}` is not listed under `{category}`")]
    UnlistedSubcategory {
        category: Category,
        subcategory: String,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ClassifyError {
    /// True when the service answered but the answer was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClassifyError::SchemaValidation { .. } | ClassifyError::UnlistedSubcategory { .. }
        )
    }
}

/// Stateless classifier over an immutable taxonomy.
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
    provider: Arc<dyn LLMProvider>,
    model: String,
    strict_subcategory: bool,
    system_prompt: String,
    schema: Value,
}

impl Classifier {
    pub fn new(taxonomy: Arc<Taxonomy>, provider: Arc<dyn LLMProvider>) -> Self {
        let system_prompt = build_system_prompt(&taxonomy);
        Self {
            taxonomy,
            provider,
            model: DEFAULT_MODEL.to_string(),
            strict_subcategory: false,
            system_prompt,
            schema: ClassificationResult::json_schema(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Reject answers whose subcategory is not listed for the chosen category.
    pub fn with_strict_subcategory(mut self, strict: bool) -> Self {
        self.strict_subcategory = strict;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        debug!(model = %self.model, chars = text.len(), "Classifying document");

        let raw = self
            .provider
            .generate_structured(StructuredRequest {
                model: &self.model,
                system: &self.system_prompt,
                user: text,
                schema_name: SCHEMA_NAME,
                schema: &self.schema,
            })
            .await?;

        let result = parse_result(&raw)?;

        if !result.is_listed_in(&self.taxonomy) {
            if self.strict_subcategory {
                return Err(ClassifyError::UnlistedSubcategory {
                    category: result.category,
                    subcategory: result.subcategory,
                });
            }
            warn!(
                category = %result.category,
                subcategory = %result.subcategory,
                "Subcategory is not listed in the taxonomy"
            );
        }

        info!(category = %result.category, subcategory = %result.subcategory, "Document classified");
        Ok(result)
    }
}

/// Parse the model's JSON text into a [`ClassificationResult`].
pub fn parse_result(raw: &str) -> Result<ClassificationResult, ClassifyError> {
    serde_json::from_str(raw).map_err(|source| ClassifyError::SchemaValidation {
        raw: raw.to_string(),
        source,
    })
}
