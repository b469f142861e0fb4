//! Build options

use e2e_plan_model::DEFAULT_RESERVED_PREFIXES;
use serde::{Deserialize, Serialize};

/// Title used when neither the document nor the settings name the plan
pub const DEFAULT_TITLE: &str = "E2E Test Plan";

/// Options for [`crate::PlanAggregator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Plan title shown in the rendered document
    pub title: String,
    /// Selector prefixes rejected by the registry
    pub reserved_prefixes: Vec<String>,
    /// Validate scenarios on the rayon thread pool
    pub parallel: bool,
}

impl BuildOptions {
    /// With plan title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With reserved selector prefixes
    #[inline]
    #[must_use]
    pub fn with_reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// With parallel scenario validation on or off
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES.iter().map(ToString::to_string).collect(),
            parallel: true,
        }
    }
}
