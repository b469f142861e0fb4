//! Loader errors

use std::path::PathBuf;

/// Failure to read or parse an input file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("failed to read {}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed TOML
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Extension maps to no known format
    #[error("unsupported document extension `.{0}` (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
}

/// Result type for loading
pub type LoadResult<T> = Result<T, LoadError>;
