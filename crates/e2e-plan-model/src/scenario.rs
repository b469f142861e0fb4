//! Scenario model
//!
//! A [`ScenarioSpec`] is the authored description of one E2E test; a
//! [`Scenario`] is the immutable, validated form. Validation only reads the
//! catalog, so independent scenarios can be checked in any order or in
//! parallel.
//!
//! Checks, in order:
//! 1. name uniqueness (book level)
//! 2. at least one step
//! 3. every required component is catalogued
//! 4. every required selector is reachable from the required components
//! 5. P0 scenarios assert at least one critical result
//! 6. step targets are owned inside the required components

use crate::catalog::{is_single_line, PageObjectCatalog};
use crate::error::{Diagnostics, ErrorKind, PlanError, PlanResult};
use crate::selector::SelectorId;
use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Scenario criticality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    /// Release-blocking
    #[serde(alias = "p0")]
    P0,
    /// Core functionality
    #[serde(alias = "p1")]
    P1,
    /// Secondary functionality
    #[serde(alias = "p2")]
    P2,
    /// Nice to have
    #[serde(alias = "p3")]
    P3,
}

impl Priority {
    /// Every tier, most critical first
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    /// Short label (`P0`)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    /// Tier name (`Critical`)
    #[must_use]
    pub const fn tier_name(self) -> &'static str {
        match self {
            Self::P0 => "Critical",
            Self::P1 => "High",
            Self::P2 => "Medium",
            Self::P3 => "Low",
        }
    }

    /// One-line meaning of the tier
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::P0 => "must pass before any release",
            Self::P1 => "core features most users rely on",
            Self::P2 => "secondary features and alternate flows",
            Self::P3 => "edge cases and polish",
        }
    }

    /// Zero-based position in [`Priority::ALL`]
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::P0 => 0,
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            "P3" => Ok(Self::P3),
            _ => Err(PlanError::invalid_format(s, "priority must be one of P0, P1, P2, P3")),
        }
    }
}

/// Document form of an expected result: plain text, or text with a flag
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExpectedResultEntry {
    /// Non-critical assertion
    Text(String),
    /// Assertion with an explicit critical-path flag
    Detailed {
        /// Assertion text
        text: String,
        /// Marks a system-critical path assertion
        #[serde(default)]
        critical: bool,
    },
}

/// Outcome a scenario asserts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ExpectedResultEntry")]
pub struct ExpectedResult {
    /// Assertion text
    pub text: String,
    /// Marks a system-critical path assertion
    pub critical: bool,
}

impl ExpectedResult {
    /// Ordinary assertion
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            critical: false,
        }
    }

    /// Critical-path assertion
    #[must_use]
    pub fn critical(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            critical: true,
        }
    }
}

impl From<ExpectedResultEntry> for ExpectedResult {
    fn from(entry: ExpectedResultEntry) -> Self {
        match entry {
            ExpectedResultEntry::Text(text) => Self::new(text),
            ExpectedResultEntry::Detailed { text, critical } => Self { text, critical },
        }
    }
}

/// Document form of a step: bare action text, or an action with targets
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StepEntry {
    /// Action only
    Action(String),
    /// Action with an optional selector and navigation target
    Detailed {
        /// What the user does
        action: String,
        /// `data-testid` the action operates on
        #[serde(default)]
        target: Option<String>,
        /// Component the step lands on
        #[serde(default, rename = "navigatesTo")]
        navigates_to: Option<String>,
    },
}

/// Authored step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StepEntry", rename_all = "camelCase")]
pub struct StepSpec {
    /// What the user does
    pub action: String,
    /// `data-testid` the action operates on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Component the step lands on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigates_to: Option<String>,
}

impl StepSpec {
    /// Step with no target
    #[must_use]
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: None,
            navigates_to: None,
        }
    }

    /// Operate on a selector
    #[must_use]
    pub fn on(mut self, selector: impl Into<String>) -> Self {
        self.target = Some(selector.into());
        self
    }

    /// Declare the component the step lands on
    #[must_use]
    pub fn navigates_to(mut self, component: impl Into<String>) -> Self {
        self.navigates_to = Some(component.into());
        self
    }
}

impl From<StepEntry> for StepSpec {
    fn from(entry: StepEntry) -> Self {
        match entry {
            StepEntry::Action(action) => Self::action(action),
            StepEntry::Detailed {
                action,
                target,
                navigates_to,
            } => Self {
                action,
                target,
                navigates_to,
            },
        }
    }
}

fn default_category() -> String {
    "General".to_string()
}

/// Authored description of one scenario, as found in a plan document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSpec {
    /// Unique scenario name
    pub name: String,
    /// Criticality tier
    pub priority: Priority,
    /// Feature area (`Authentication`)
    #[serde(default = "default_category")]
    pub category: String,
    /// State required before the first step
    #[serde(default)]
    pub preconditions: Vec<String>,
    /// Ordered steps
    #[serde(default)]
    #[schemars(with = "Vec<StepEntry>")]
    pub steps: Vec<StepSpec>,
    /// Assertions
    #[serde(default)]
    #[schemars(with = "Vec<ExpectedResultEntry>")]
    pub expected_results: Vec<ExpectedResult>,
    /// Page objects the test drives
    #[serde(default)]
    pub required_components: Vec<String>,
    /// `data-testid` hooks the test relies on
    #[serde(default)]
    pub required_selectors: Vec<String>,
}

impl ScenarioSpec {
    /// Empty scenario in the `General` category
    #[must_use]
    pub fn new(name: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            priority,
            category: default_category(),
            preconditions: Vec::new(),
            steps: Vec::new(),
            expected_results: Vec::new(),
            required_components: Vec::new(),
            required_selectors: Vec::new(),
        }
    }

    /// Set the category
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Add a precondition
    #[must_use]
    pub fn with_precondition(mut self, precondition: impl Into<String>) -> Self {
        self.preconditions.push(precondition.into());
        self
    }

    /// Add a step
    #[must_use]
    pub fn with_step(mut self, step: impl Into<StepSpec>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Add an ordinary expected result
    #[must_use]
    pub fn expecting(mut self, text: impl Into<String>) -> Self {
        self.expected_results.push(ExpectedResult::new(text));
        self
    }

    /// Add a critical-path expected result
    #[must_use]
    pub fn expecting_critical(mut self, text: impl Into<String>) -> Self {
        self.expected_results.push(ExpectedResult::critical(text));
        self
    }

    /// Add required components
    #[must_use]
    pub fn requiring_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_components.extend(components.into_iter().map(Into::into));
        self
    }

    /// Add required selectors
    #[must_use]
    pub fn requiring_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_selectors.extend(selectors.into_iter().map(Into::into));
        self
    }
}

impl From<&str> for StepSpec {
    fn from(action: &str) -> Self {
        Self::action(action)
    }
}

impl From<String> for StepSpec {
    fn from(action: String) -> Self {
        Self::action(action)
    }
}

/// Validated step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    index: usize,
    action: String,
    target: Option<SelectorId>,
    navigates_to: Option<String>,
}

impl Step {
    /// 1-based position in the scenario
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// What the user does
    #[inline]
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Selector the step operates on
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&SelectorId> {
        self.target.as_ref()
    }

    /// Component the step lands on
    #[inline]
    #[must_use]
    pub fn navigates_to(&self) -> Option<&str> {
        self.navigates_to.as_deref()
    }
}

/// Validated, immutable scenario
///
/// Changing a scenario means validating a replacement through
/// [`ScenarioBook::replace_scenario`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    name: String,
    priority: Priority,
    category: String,
    preconditions: Vec<String>,
    steps: Vec<Step>,
    expected_results: Vec<ExpectedResult>,
    required_components: IndexSet<String>,
    required_selectors: IndexSet<SelectorId>,
}

impl Scenario {
    /// Scenario name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Criticality tier
    #[inline]
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Feature area
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Preconditions, in order
    #[inline]
    #[must_use]
    pub fn preconditions(&self) -> &[String] {
        &self.preconditions
    }

    /// Steps, in order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Expected results, without duplicates
    #[inline]
    #[must_use]
    pub fn expected_results(&self) -> &[ExpectedResult] {
        &self.expected_results
    }

    /// Required components, in declaration order
    pub fn required_components(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.required_components.iter().map(String::as_str)
    }

    /// Required selectors, in declaration order
    pub fn required_selectors(&self) -> impl ExactSizeIterator<Item = &SelectorId> + '_ {
        self.required_selectors.iter()
    }

    /// True when any expected result is flagged critical
    #[must_use]
    pub fn has_critical_assertion(&self) -> bool {
        self.expected_results.iter().any(|r| r.critical)
    }

    /// Components the steps navigate to
    pub fn navigation_targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(Step::navigates_to)
    }

    /// Authored form of this scenario
    #[must_use]
    pub fn to_spec(&self) -> ScenarioSpec {
        ScenarioSpec {
            name: self.name.clone(),
            priority: self.priority,
            category: self.category.clone(),
            preconditions: self.preconditions.clone(),
            steps: self
                .steps
                .iter()
                .map(|s| StepSpec {
                    action: s.action.clone(),
                    target: s.target.as_ref().map(ToString::to_string),
                    navigates_to: s.navigates_to.clone(),
                })
                .collect(),
            expected_results: self.expected_results.clone(),
            required_components: self.required_components.iter().cloned().collect(),
            required_selectors: self.required_selectors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Validate one scenario against a built catalog
///
/// Checks everything except name uniqueness, which needs the set of sibling
/// scenarios. When a required component is missing, selector reachability is
/// not evaluated: the missing component is the root cause.
///
/// # Errors
/// Every detected failure for this scenario.
pub fn validate_scenario(catalog: &PageObjectCatalog, spec: &ScenarioSpec) -> Result<Scenario, Diagnostics> {
    let mut diags = Diagnostics::new();
    let name = spec.name.trim();
    let referrer = format!("scenario `{name}`");

    if name.is_empty() {
        diags.push(PlanError::invalid_format(&spec.name, "scenario name cannot be empty"));
    }

    let texts = [("name", spec.name.as_str()), ("category", spec.category.as_str())]
        .into_iter()
        .chain(spec.preconditions.iter().map(|p| ("precondition", p.as_str())))
        .chain(spec.steps.iter().map(|s| ("step", s.action.as_str())))
        .chain(spec.expected_results.iter().map(|r| ("expected result", r.text.as_str())));
    for (field, text) in texts {
        if !is_single_line(text) {
            diags.push(PlanError::invalid_format(
                name,
                format!("{field} of {referrer} contains a line break or control character"),
            ));
        }
    }

    if spec.steps.is_empty() {
        diags.push(PlanError::new(
            ErrorKind::EmptySteps,
            name,
            format!("scenario `{name}` has no steps"),
        ));
    }

    let mut unresolved = false;
    for component in &spec.required_components {
        if !catalog.contains(component) {
            diags.push(PlanError::unknown_component(component.as_str(), &referrer));
            unresolved = true;
        }
    }
    for step in &spec.steps {
        if let Some(target) = step.navigates_to.as_deref() {
            if !catalog.contains(target) {
                diags.push(PlanError::unknown_component(target, &referrer));
            }
        }
    }

    if !unresolved {
        let mut reach: IndexSet<&str> = IndexSet::new();
        for component in &spec.required_components {
            reach.extend(catalog.reachable_from(component));
        }

        let mut unreachable: IndexSet<&str> = IndexSet::new();
        for selector in &spec.required_selectors {
            let message = match catalog.owner_of(selector) {
                Some(owner) if reach.contains(owner) => continue,
                Some(owner) => format!(
                    "`{selector}` is owned by `{owner}`, which no required component of {referrer} reaches"
                ),
                None => format!("`{selector}` is required by {referrer} but no component declares it"),
            };
            unreachable.insert(selector.as_str());
            diags.push(PlanError::new(ErrorKind::UnreachableSelector, selector.as_str(), message));
        }

        for step in &spec.steps {
            let Some(target) = step.target.as_deref() else {
                continue;
            };
            if unreachable.contains(target) {
                continue;
            }
            let message = match catalog.owner_of(target) {
                Some(owner) if reach.contains(owner) => continue,
                Some(owner) => format!(
                    "step `{}` of {referrer} targets `{target}`, owned by `{owner}` outside the required components",
                    step.action
                ),
                None => format!("step `{}` of {referrer} targets unregistered selector `{target}`", step.action),
            };
            diags.push(PlanError::new(ErrorKind::UnknownSelectorTarget, target, message));
        }
    }

    if spec.priority == Priority::P0 && !spec.expected_results.iter().any(|r| r.critical) {
        diags.push(PlanError::new(
            ErrorKind::MissingCriticalAssertion,
            name,
            format!("P0 {referrer} needs at least one expected result flagged critical"),
        ));
    }

    diags.collapse(ErrorKind::UnknownComponent);
    if !diags.is_empty() {
        return Err(diags);
    }

    let registry = catalog.registry();
    let steps = spec
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| Step {
            index: i + 1,
            action: step.action.clone(),
            target: step.target.as_deref().and_then(|t| registry.get(t)).cloned(),
            navigates_to: step.navigates_to.clone(),
        })
        .collect();

    let mut expected_results: Vec<ExpectedResult> = Vec::with_capacity(spec.expected_results.len());
    for result in &spec.expected_results {
        match expected_results.iter_mut().find(|r| r.text == result.text) {
            Some(existing) => existing.critical |= result.critical,
            None => expected_results.push(result.clone()),
        }
    }

    Ok(Scenario {
        name: name.to_string(),
        priority: spec.priority,
        category: spec.category.clone(),
        preconditions: spec.preconditions.clone(),
        steps,
        expected_results,
        required_components: spec.required_components.iter().cloned().collect(),
        required_selectors: spec
            .required_selectors
            .iter()
            .filter_map(|s| registry.get(s))
            .cloned()
            .collect(),
    })
}

/// Named collection of validated scenarios, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioBook {
    scenarios: IndexMap<String, Scenario>,
}

impl ScenarioBook {
    /// Create an empty book
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a scenario
    ///
    /// # Errors
    /// `Duplicate` for a taken name, plus every failure from
    /// [`validate_scenario`].
    pub fn create_scenario(
        &mut self,
        catalog: &PageObjectCatalog,
        spec: ScenarioSpec,
    ) -> Result<&Scenario, Diagnostics> {
        let mut diags = Diagnostics::new();
        if self.scenarios.contains_key(spec.name.trim()) {
            diags.push(PlanError::duplicate(spec.name.trim(), "scenario"));
        }
        match validate_scenario(catalog, &spec) {
            Ok(scenario) if diags.is_empty() => {
                tracing::debug!(scenario = scenario.name(), priority = %scenario.priority(), "created scenario");
                let key = scenario.name.clone();
                Ok(self.scenarios.entry(key).or_insert(scenario))
            }
            Ok(_) => Err(diags),
            Err(more) => {
                diags.merge(more);
                Err(diags)
            }
        }
    }

    /// Validate `spec` and swap it in for the scenario of the same name,
    /// keeping its position. Adds the scenario when the name is new.
    ///
    /// Returns the replaced scenario, if any.
    ///
    /// # Errors
    /// Every failure from [`validate_scenario`]; the book is unchanged.
    pub fn replace_scenario(
        &mut self,
        catalog: &PageObjectCatalog,
        spec: ScenarioSpec,
    ) -> Result<Option<Scenario>, Diagnostics> {
        let scenario = validate_scenario(catalog, &spec)?;
        Ok(self.scenarios.insert(scenario.name.clone(), scenario))
    }

    /// Add an already validated scenario
    ///
    /// # Errors
    /// `Duplicate` if the name is taken.
    pub fn insert(&mut self, scenario: Scenario) -> PlanResult<()> {
        if self.scenarios.contains_key(&scenario.name) {
            return Err(PlanError::duplicate(scenario.name, "scenario"));
        }
        self.scenarios.insert(scenario.name.clone(), scenario);
        Ok(())
    }

    /// Look up a scenario
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    /// Scenarios in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Scenario> + '_ {
        self.scenarios.values()
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// True when empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
