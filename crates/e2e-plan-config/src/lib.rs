//! E2E Plan Config
//!
//! Loading of plan documents (JSON, YAML, TOML) and validator settings.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod settings;

// Re-exports
pub use document::{load_document, parse_document, schema_json, DocumentFormat, PlanDocument};
pub use error::{LoadError, LoadResult};
pub use settings::Settings;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
