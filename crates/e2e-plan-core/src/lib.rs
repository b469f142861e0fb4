//! E2E Plan Core
//!
//! Composes the page object catalog and scenarios into a sealed [`Plan`],
//! deriving the prioritization matrix and implementation roadmap.
//!
//! # Example
//!
//! ```rust
//! use e2e_plan_core::build_plan;
//! use e2e_plan_model::{ComponentSpec, Priority, ScenarioSpec};
//!
//! let components = vec![ComponentSpec::page("LoginPage").with_selectors(["login-submit-button"])];
//! let scenarios = vec![ScenarioSpec::new("Submit", Priority::P2)
//!     .with_step("Click submit")
//!     .requiring_components(["LoginPage"])
//!     .requiring_selectors(["login-submit-button"])];
//!
//! let plan = build_plan(&components, &scenarios).unwrap();
//! assert!(plan.verify().is_ok());
//! ```

#![warn(missing_docs)]

pub mod aggregator;
pub mod options;
pub mod plan;

// Re-exports
pub use aggregator::{build_plan, PlanAggregator};
pub use options::{BuildOptions, DEFAULT_TITLE};
pub use plan::{compute_validation_hash, Phase, Plan, PlanSummary, PrioritizationMatrix, Roadmap};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
