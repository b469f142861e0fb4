//! E2E Plan Model
//!
//! Typed building blocks of an end-to-end test plan.
//!
//! # Overview
//!
//! - **SelectorRegistry**: unique, kebab-case `data-testid` namespace
//! - **PageObjectCatalog**: page objects, selector ownership and an acyclic
//!   dependency graph
//! - **ScenarioBook**: validated scenarios checked against the catalog
//!
//! # Example
//!
//! ```rust
//! use e2e_plan_model::{ComponentKind, PageObjectCatalog, Priority, ScenarioBook, ScenarioSpec};
//!
//! let mut catalog = PageObjectCatalog::new();
//! catalog.add_component("LoginPage", ComponentKind::Page).unwrap();
//! catalog.add_selector_to_component("LoginPage", "login-submit-button").unwrap();
//!
//! let mut book = ScenarioBook::new();
//! let spec = ScenarioSpec::new("User Login", Priority::P0)
//!     .with_step("Click submit")
//!     .expecting_critical("User is signed in")
//!     .requiring_components(["LoginPage"])
//!     .requiring_selectors(["login-submit-button"]);
//! assert!(book.create_scenario(&catalog, spec).is_ok());
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod scenario;
pub mod selector;

// Re-exports
pub use catalog::{
    is_single_line, ComponentKind, ComponentSpec, MethodSignature, PageObjectCatalog, Param, ParamType, PomComponent,
    ReturnType,
};
pub use error::{Diagnostics, ErrorKind, PlanError, PlanResult};
pub use scenario::{
    validate_scenario, ExpectedResult, ExpectedResultEntry, Priority, Scenario, ScenarioBook, ScenarioSpec, Step,
    StepEntry, StepSpec,
};
pub use selector::{SelectorId, SelectorRegistry, DEFAULT_RESERVED_PREFIXES};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building plans
    pub use crate::{
        ComponentKind, ComponentSpec, Diagnostics, ErrorKind, MethodSignature, PageObjectCatalog, ParamType,
        PlanError, PlanResult, Priority, Scenario, ScenarioBook, ScenarioSpec, SelectorId, SelectorRegistry,
        StepSpec,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
