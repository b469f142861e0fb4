//! E2E Plan Render
//!
//! Serializes a validated [`e2e_plan_core::Plan`] to canonical markdown and
//! parses rendered documents back into a heading outline.

#![warn(missing_docs)]

pub mod markdown;
pub mod outline;

// Re-exports
pub use markdown::{render, EMPTY_TIER};
pub use outline::{outline, titles_at, Heading};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
