//! Validator settings
//!
//! Read from a TOML file passed with `--config`:
//!
//! ```toml
//! title = "Acme Web App"
//! reserved-prefixes = ["data-", "aria-", "qa-"]
//! parallel = false
//! ```

use crate::error::{LoadError, LoadResult};
use e2e_plan_core::BuildOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file contents; unset fields keep the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Title used when the document has none
    pub title: Option<String>,
    /// Selector prefixes to reject
    pub reserved_prefixes: Option<Vec<String>>,
    /// Validate scenarios in parallel
    pub parallel: Option<bool>,
}

impl Settings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    /// `Toml` on malformed input or unknown keys.
    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a settings file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Toml` if it does not parse.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// With default title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With reserved selector prefixes
    #[inline]
    #[must_use]
    pub fn with_reserved_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.reserved_prefixes = Some(prefixes);
        self
    }

    /// With parallel validation on or off
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Build options for one document; the document title wins over the
    /// configured one
    #[must_use]
    pub fn to_build_options(&self, document_title: Option<&str>) -> BuildOptions {
        let mut options = BuildOptions::default();
        if let Some(title) = document_title.or(self.title.as_deref()) {
            options = options.with_title(title);
        }
        if let Some(prefixes) = &self.reserved_prefixes {
            options = options.with_reserved_prefixes(prefixes.iter().cloned());
        }
        if let Some(parallel) = self.parallel {
            options = options.with_parallel(parallel);
        }
        options
    }
}
