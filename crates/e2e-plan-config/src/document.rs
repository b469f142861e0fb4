//! Plan documents
//!
//! A plan document lists component specs and scenario specs with camelCase
//! keys. The format follows the file extension: `.json`, `.yaml`/`.yml` or
//! `.toml`; a path without an extension is read as YAML.

use crate::error::{LoadError, LoadResult};
use e2e_plan_model::{ComponentSpec, ScenarioSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Structured input describing a whole plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    /// Plan title; overrides the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page object components
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    /// Test scenarios
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

/// Serialization format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml`, `.yml`, or no extension
    Yaml,
    /// `.toml`
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    ///
    /// # Errors
    /// `UnsupportedFormat` for an unrecognized extension.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(Self::Yaml);
        };
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        })
    }
}

/// Parse a document from text
///
/// # Errors
/// The format's parse error.
pub fn parse_document(text: &str, format: DocumentFormat) -> LoadResult<PlanDocument> {
    let document = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        DocumentFormat::Toml => toml::from_str(text)?,
    };
    Ok(document)
}

/// Read and parse a document file
///
/// # Errors
/// `Io` if the file cannot be read, `UnsupportedFormat` for an unknown
/// extension, or the format's parse error.
pub fn load_document(path: &Path) -> LoadResult<PlanDocument> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&text, format)?;
    tracing::debug!(
        path = %path.display(),
        %format,
        components = document.components.len(),
        scenarios = document.scenarios.len(),
        "loaded plan document"
    );
    Ok(document)
}

/// JSON Schema of [`PlanDocument`], pretty-printed
///
/// # Errors
/// Serialization failure of the generated schema.
pub fn schema_json() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(PlanDocument);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2e_plan_model::{ComponentKind, Priority, ReturnType};

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("plan.json")).unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("plan.YML")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("plan.toml")).unwrap(), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("plan")).unwrap(), DocumentFormat::Yaml);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("plan.md")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "md"
        ));
    }

    #[test]
    fn parse_toml_tables() {
        let text = r#"
title = "Shop"

[[components]]
name = "CartPage"
selectors = ["cart-checkout-button"]

[[components.methods]]
name = "checkout"
returns = "CheckoutPage"
selectors = ["cart-checkout-button"]

[[components]]
name = "CheckoutPage"
kind = "page"

[[scenarios]]
name = "Checkout"
priority = "P1"
steps = ["Open cart", { action = "Click checkout", target = "cart-checkout-button", navigatesTo = "CheckoutPage" }]
expectedResults = ["Checkout form is shown"]
requiredComponents = ["CartPage"]
"#;
        let doc = parse_document(text, DocumentFormat::Toml).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Shop"));
        assert_eq!(doc.components[0].kind, ComponentKind::Page);
        assert_eq!(
            doc.components[0].methods[0].returns,
            ReturnType::Component("CheckoutPage".into())
        );
        assert_eq!(doc.scenarios[0].priority, Priority::P1);
        assert_eq!(doc.scenarios[0].steps[1].navigates_to.as_deref(), Some("CheckoutPage"));
    }

    #[test]
    fn parse_json_with_defaults() {
        let doc = parse_document(r#"{"components": [{"name": "Topbar", "kind": "component"}]}"#, DocumentFormat::Json)
            .unwrap();
        assert!(doc.title.is_none());
        assert!(doc.scenarios.is_empty());
        assert!(doc.components[0].depends_on.is_empty());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = parse_document("components: [", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, LoadError::Yaml(_)));
    }

    #[test]
    fn schema_describes_document() {
        let schema = schema_json().unwrap();
        assert!(schema.contains("\"PlanDocument\""));
        assert!(schema.contains("requiredSelectors"));
        assert!(schema.contains("dependsOn"));
    }
}
