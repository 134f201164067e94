//! Taxonomy Loader
//!
//! Reads the category definitions (`context_types`) and the allowed
//! subcategories per category (`subcategories`) from a JSON document.
//! The loaded taxonomy is immutable and is shared with the classifier.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::Category;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse taxonomy from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid taxonomy: {0}")]
    Invalid(String),
}

/// One category with its description and permitted subcategories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub description: String,
    pub subcategories: Vec<String>,
}

#[derive(Deserialize)]
struct RawDefinitions {
    context_types: Map<String, Value>,
    subcategories: Map<String, Value>,
}

/// Categories in document order, each with a non-empty subcategory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<CategoryEntry>,
}

impl Taxonomy {
    /// Load the taxonomy from a definitions file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let taxonomy = Self::parse(&content, &path.display().to_string())?;
        debug!(path = %path.display(), categories = taxonomy.len(), "Taxonomy loaded");
        Ok(taxonomy)
    }

    pub fn from_json_str(content: &str) -> Result<Self, TaxonomyError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, TaxonomyError> {
        let raw: RawDefinitions =
            serde_json::from_str(content).map_err(|source| TaxonomyError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        if raw.context_types.is_empty() {
            return Err(TaxonomyError::Invalid("`context_types` is empty".into()));
        }

        for name in raw.subcategories.keys() {
            if !raw.context_types.contains_key(name) {
                warn!(category = %name, "Subcategories listed for unknown category; ignoring");
            }
        }

        let mut entries = Vec::with_capacity(raw.context_types.len());
        for (name, description) in &raw.context_types {
            let description = description.as_str().ok_or_else(|| {
                TaxonomyError::Invalid(format!("description for `{}` must be a string", name))
            })?;

            let subcategories = match raw.subcategories.get(name) {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            TaxonomyError::Invalid(format!(
                                "subcategories for `{}` must be strings",
                                name
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => {
                    return Err(TaxonomyError::Invalid(format!(
                        "subcategories for `{}` must be an array",
                        name
                    )))
                }
                None => Vec::new(),
            };

            if subcategories.is_empty() {
                return Err(TaxonomyError::Invalid(format!(
                    "category `{}` has no subcategories",
                    name
                )));
            }

            if name.parse::<Category>().is_err() {
                warn!(category = %name, "Category is not part of the classification schema");
            }

            entries.push(CategoryEntry {
                name: name.clone(),
                description: description.to_string(),
                subcategories,
            });
        }

        Ok(Self { entries })
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Subcategories for `name`, empty when the category is unknown.
    pub fn subcategories(&self, name: &str) -> &[String] {
        self.get(name).map(|e| e.subcategories.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "context_types": {
            "Litigation": "Court filings and pleadings",
            "Contract": "Agreements between parties"
        },
        "subcategories": {
            "Contract": ["NDA", "Lease"],
            "Litigation": ["Motion"]
        }
    }"#;

    #[test]
    fn test_load_preserves_document_order() {
        let taxonomy = Taxonomy::from_json_str(SAMPLE).unwrap();
        let names: Vec<_> = taxonomy.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Litigation", "Contract"]);
        assert_eq!(taxonomy.subcategories("Contract"), ["NDA", "Lease"]);
        assert!(taxonomy.subcategories("Email").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let taxonomy = Taxonomy::load(file.path()).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(
            taxonomy.get("Litigation").unwrap().description,
            "Court filings and pleadings"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Taxonomy::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TaxonomyError::Io { .. }));
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let err = Taxonomy::from_json_str(r#"{"context_types": {"Contract": "x"}}"#).unwrap_err();
        assert!(matches!(err, TaxonomyError::Parse { .. }));
    }

    #[test]
    fn test_category_without_subcategories_rejected() {
        let err = Taxonomy::from_json_str(
            r#"{"context_types": {"Contract": "x", "Email": "y"},
                "subcategories": {"Contract": ["NDA"], "Email": []}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Email"));

        let err = Taxonomy::from_json_str(
            r#"{"context_types": {"Contract": "x"}, "subcategories": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaxonomyError::Invalid(_)));
    }

    #[test]
    fn test_non_string_entries_rejected() {
        assert!(Taxonomy::from_json_str(
            r#"{"context_types": {"Contract": 3}, "subcategories": {"Contract": ["NDA"]}}"#
        )
        .is_err());
        assert!(Taxonomy::from_json_str(
            r#"{"context_types": {"Contract": "x"}, "subcategories": {"Contract": [1]}}"#
        )
        .is_err());
        assert!(Taxonomy::from_json_str(
            r#"{"context_types": {"Contract": "x"}, "subcategories": {"Contract": "NDA"}}"#
        )
        .is_err());
    }

    #[test]
    fn test_empty_context_types_rejected() {
        let err =
            Taxonomy::from_json_str(r#"{"context_types": {}, "subcategories": {}}"#).unwrap_err();
        assert!(matches!(err, TaxonomyError::Invalid(_)));
    }

    #[test]
    fn test_shipped_definitions_load() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("definitions.json");
        let taxonomy = Taxonomy::load(path).unwrap();
        for category in Category::ALL {
            assert!(
                taxonomy.get(category.as_str()).is_some(),
                "missing {}",
                category
            );
        }
    }
}
