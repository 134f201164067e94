use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::taxonomy::Taxonomy;

/// One of the predefined legal-context categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    Contract,
    Litigation,
    Regulatory,
    Financial,
    Statutory,
    Email,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Contract,
        Category::Litigation,
        Category::Regulatory,
        Category::Financial,
        Category::Statutory,
        Category::Email,
        Category::Other,
    ];

    /// Name used on the wire and in the taxonomy file
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Contract => "Contract",
            Category::Litigation => "Litigation",
            Category::Regulatory => "Regulatory",
            Category::Financial => "Financial",
            Category::Statutory => "Statutory",
            Category::Email => "Email",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Structured answer returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ClassificationResult {
    // Documented on the enum so the generated schema stays a flat `enum`.
    pub category: Category,
    /// One of the predefined subcategories for the chosen category
    pub subcategory: String,
}

impl ClassificationResult {
    /// True when the subcategory is listed under the chosen category.
    pub fn is_listed_in(&self, taxonomy: &Taxonomy) -> bool {
        taxonomy
            .subcategories(self.category.as_str())
            .iter()
            .any(|s| s == &self.subcategory)
    }

    /// JSON schema submitted with every structured-generation request.
    pub fn json_schema() -> serde_json::Value {
        let generator = SchemaSettings::draft07()
            .with(|s| {
                s.inline_subschemas = true;
                s.meta_schema = None;
            })
            .into_generator();
        let mut schema = serde_json::json!(generator.into_root_schema_for::<ClassificationResult>());
        if let Some(object) = schema.as_object_mut() {
            object.remove("title");
            object.remove("definitions");
        }
        schema
    }
}
