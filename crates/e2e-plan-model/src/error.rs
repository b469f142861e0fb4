//! Validation diagnostics
//!
//! Every stage of plan construction reports failures as [`PlanError`]
//! values. Stages that check more than one rule collect them into
//! [`Diagnostics`] instead of stopping at the first failure, so an author
//! sees every problem in one pass.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Classification of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Identifier is not kebab-case, is empty, or uses a reserved prefix
    InvalidFormat,
    /// Name or identifier already registered
    Duplicate,
    /// Selector already owned by another component
    NotOwned,
    /// Method or step references a selector outside its reach
    UnknownSelectorTarget,
    /// Dependency edge would close a cycle
    CycleDetected,
    /// Scenario has no steps
    EmptySteps,
    /// Referenced component does not exist in the catalog
    UnknownComponent,
    /// Required selector not owned by any required component or dependency
    UnreachableSelector,
    /// P0 scenario without a critical expected result
    MissingCriticalAssertion,
    /// Navigation method with no scenario step performing the transition
    UndeclaredTransition,
    /// Plan failed integrity verification
    IncompletePlan,
}

impl ErrorKind {
    /// Stable name used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidFormat => "InvalidFormat",
            Self::Duplicate => "Duplicate",
            Self::NotOwned => "NotOwned",
            Self::UnknownSelectorTarget => "UnknownSelectorTarget",
            Self::CycleDetected => "CycleDetected",
            Self::EmptySteps => "EmptySteps",
            Self::UnknownComponent => "UnknownComponent",
            Self::UnreachableSelector => "UnreachableSelector",
            Self::MissingCriticalAssertion => "MissingCriticalAssertion",
            Self::UndeclaredTransition => "UndeclaredTransition",
            Self::IncompletePlan => "IncompletePlan",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single validation failure
///
/// `entity` names the offending thing: a selector id, a component name, a
/// scenario name, or `Component.method` for method-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} [{entity}]: {message}")]
pub struct PlanError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Name of the offending entity
    pub entity: String,
    /// Human-readable explanation
    pub message: String,
}

impl PlanError {
    /// Create a new diagnostic
    #[must_use]
    pub fn new(kind: ErrorKind, entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create an `InvalidFormat` diagnostic
    #[must_use]
    pub fn invalid_format(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, entity, reason)
    }

    /// Create a `Duplicate` diagnostic
    #[must_use]
    pub fn duplicate(entity: impl Into<String>, what: &str) -> Self {
        let entity = entity.into();
        let message = format!("{what} `{entity}` is already declared");
        Self::new(ErrorKind::Duplicate, entity, message)
    }

    /// Create an `UnknownComponent` diagnostic for `missing`, referenced by `referrer`
    #[must_use]
    pub fn unknown_component(missing: impl Into<String>, referrer: &str) -> Self {
        let missing = missing.into();
        let message = format!("component `{missing}` is not in the catalog (referenced by {referrer})");
        Self::new(ErrorKind::UnknownComponent, missing, message)
    }

    /// Create an `IncompletePlan` diagnostic
    #[must_use]
    pub fn incomplete_plan(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompletePlan, entity, reason)
    }

    /// Check the failure classification
    #[inline]
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

/// Ordered collection of validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<PlanError>);

impl Diagnostics {
    /// Create an empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a diagnostic
    pub fn push(&mut self, error: PlanError) {
        self.0.push(error);
    }

    /// Append every diagnostic from another collection, keeping its order
    pub fn merge(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Number of diagnostics
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no failures were recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in recording order
    pub fn iter(&self) -> std::slice::Iter<'_, PlanError> {
        self.0.iter()
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &PlanError> + '_ {
        self.0.iter().filter(move |e| e.kind == kind)
    }

    /// Count diagnostics of one kind
    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Keep only diagnostics matching the predicate
    pub fn retain(&mut self, keep: impl FnMut(&PlanError) -> bool) {
        self.0.retain(keep);
    }

    /// Merge diagnostics of `kind` that name the same entity into the first
    /// occurrence, noting how many other references were folded in
    pub fn collapse(&mut self, kind: ErrorKind) {
        let mut kept: Vec<PlanError> = Vec::with_capacity(self.0.len());
        let mut folded: Vec<(usize, usize)> = Vec::new();
        for error in self.0.drain(..) {
            if error.kind == kind {
                if let Some(pos) = kept.iter().position(|e| e.kind == kind && e.entity == error.entity) {
                    match folded.iter_mut().find(|(i, _)| *i == pos) {
                        Some((_, n)) => *n += 1,
                        None => folded.push((pos, 1)),
                    }
                    continue;
                }
            }
            kept.push(error);
        }
        for (pos, n) in folded {
            kept[pos]
                .message
                .push_str(&format!(" and {n} other reference(s)"));
        }
        self.0 = kept;
    }

    /// Take the underlying list
    #[must_use]
    pub fn into_vec(self) -> Vec<PlanError> {
        self.0
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    /// Returns the collection itself when it holds any diagnostic.
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl From<PlanError> for Diagnostics {
    fn from(error: PlanError) -> Self {
        Self(vec![error])
    }
}

impl From<Vec<PlanError>> for Diagnostics {
    fn from(errors: Vec<PlanError>) -> Self {
        Self(errors)
    }
}

impl Extend<PlanError> for Diagnostics {
    fn extend<I: IntoIterator<Item = PlanError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = PlanError;
    type IntoIter = std::vec::IntoIter<PlanError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a PlanError;
    type IntoIter = std::slice::Iter<'a, PlanError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result alias for single-failure operations
pub type PlanResult<T> = Result<T, PlanError>;
