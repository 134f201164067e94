//! Legal Context Classifier
//!
//! Classifies legal document text into a category and subcategory:
//! - Taxonomy of categories/subcategories loaded from `definitions.json`
//! - Taxonomy-driven instruction and one structured-generation call per document
//! - Schema validation of the answer against a closed category enum
//! - PDF text extraction for uploads
//! - CLI and browser front ends

pub mod classifier;
pub mod config;
pub mod pdf;
pub mod server;
pub mod services;
pub mod taxonomy;
pub mod utils;

// Re-exports for convenience
pub use classifier::{Category, ClassificationResult, Classifier, ClassifyError};
pub use config::AppConfig;
pub use taxonomy::Taxonomy;
