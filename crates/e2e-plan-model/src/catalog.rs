//! Page object catalog
//!
//! Models Page Object Model classes as [`PomComponent`]s: the selectors each
//! one renders, the interaction methods it exposes, and the components it
//! embeds. The catalog enforces three structural rules:
//!
//! - every selector is owned by exactly one component
//! - a method only touches selectors owned by its component or by a
//!   component reachable through declared dependencies
//! - the dependency graph stays acyclic; a rejected edge is rolled back

use crate::error::{Diagnostics, ErrorKind, PlanError, PlanResult};
use crate::selector::{SelectorId, SelectorRegistry};
use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Whether a component is a routed page or an embedded UI part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Routed page (`LoginPage`)
    #[default]
    Page,
    /// Reusable part rendered inside pages (`Topbar`)
    Component,
}

impl ComponentKind {
    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Component => "component",
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic parameter types; no framework types leak into the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free text
    String,
    /// Numeric value
    Number,
    /// Flag
    Boolean,
    /// One of a fixed set of values
    Enum,
    /// Calendar date
    Date,
}

impl ParamType {
    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Date => "date",
        }
    }
}

/// Named method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub ty: ParamType,
}

impl Param {
    /// Create a parameter
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Method return type
///
/// Navigation methods return the page object they land on, which makes the
/// transition an explicit edge in the plan. Serialized as `"void"` or the
/// component name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReturnType {
    /// No navigation
    #[default]
    Void,
    /// Navigates to the named component
    Component(String),
}

impl ReturnType {
    /// Component the method navigates to, if any
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Void => None,
            Self::Component(name) => Some(name),
        }
    }
}

impl From<String> for ReturnType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("void") {
            Self::Void
        } else {
            Self::Component(trimmed.to_string())
        }
    }
}

impl From<ReturnType> for String {
    fn from(value: ReturnType) -> Self {
        match value {
            ReturnType::Void => "void".to_string(),
            ReturnType::Component(name) => name,
        }
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Component(name) => f.write_str(name),
        }
    }
}

/// Page object method signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    /// Method name (`fillEmail`)
    pub name: String,
    /// Ordered parameters
    #[serde(default)]
    pub params: Vec<Param>,
    /// `void` or the component the method navigates to
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub returns: ReturnType,
    /// Selectors the method interacts with
    #[serde(default)]
    pub selectors: Vec<String>,
}

impl MethodSignature {
    /// Create a `void` method with no parameters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: ReturnType::Void,
            selectors: Vec::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    /// Declare the component this method navigates to
    #[must_use]
    pub fn returning(mut self, component: impl Into<String>) -> Self {
        self.returns = ReturnType::Component(component.into());
        self
    }

    /// Declare the selectors this method touches
    #[must_use]
    pub fn touching<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors.extend(selectors.into_iter().map(Into::into));
        self
    }
}

impl Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty.label())?;
        }
        write!(f, "): {}", self.returns)
    }
}

/// Input description of one component, as found in a plan document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Unique component name
    pub name: String,
    /// Page or embedded component
    #[serde(default)]
    pub kind: ComponentKind,
    /// `data-testid` values this component renders
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Interaction methods
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
    /// Components embedded in or reachable from this one
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ComponentSpec {
    /// Describe a page
    #[must_use]
    pub fn page(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Page)
    }

    /// Describe an embedded component
    #[must_use]
    pub fn component(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Component)
    }

    fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            selectors: Vec::new(),
            methods: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Add owned selectors
    #[must_use]
    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors.extend(selectors.into_iter().map(Into::into));
        self
    }

    /// Add a method
    #[must_use]
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Add dependencies
    #[must_use]
    pub fn depends_on<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(components.into_iter().map(Into::into));
        self
    }
}

/// A catalogued page object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomComponent {
    name: String,
    kind: ComponentKind,
    selectors: IndexSet<SelectorId>,
    methods: Vec<MethodSignature>,
    dependencies: IndexSet<String>,
}

impl PomComponent {
    fn new(name: &str, kind: ComponentKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            selectors: IndexSet::new(),
            methods: Vec::new(),
            dependencies: IndexSet::new(),
        }
    }

    /// Component name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Page or embedded component
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Owned selectors, in declaration order
    pub fn selectors(&self) -> impl ExactSizeIterator<Item = &SelectorId> + '_ {
        self.selectors.iter()
    }

    /// Check direct ownership
    #[inline]
    #[must_use]
    pub fn owns(&self, selector: &str) -> bool {
        self.selectors.contains(selector)
    }

    /// Methods, in declaration order
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    /// Direct dependencies, in declaration order
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.dependencies.iter().map(String::as_str)
    }

    /// Authored form of this component
    #[must_use]
    pub fn to_spec(&self) -> ComponentSpec {
        ComponentSpec {
            name: self.name.clone(),
            kind: self.kind,
            selectors: self.selectors.iter().map(ToString::to_string).collect(),
            methods: self.methods.clone(),
            depends_on: self.dependencies.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Catalog of page objects plus the selector namespace they share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageObjectCatalog {
    registry: SelectorRegistry,
    components: IndexMap<String, PomComponent>,
    owners: IndexMap<SelectorId, String>,
}

impl PageObjectCatalog {
    /// Create an empty catalog with a default registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(SelectorRegistry::new())
    }

    /// Create an empty catalog over an existing registry
    #[must_use]
    pub fn with_registry(registry: SelectorRegistry) -> Self {
        Self {
            registry,
            components: IndexMap::new(),
            owners: IndexMap::new(),
        }
    }

    /// Selector namespace
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SelectorRegistry {
        &self.registry
    }

    /// Add a component
    ///
    /// # Errors
    /// - `InvalidFormat` for a blank or multi-line name
    /// - `Duplicate` on a name collision
    pub fn add_component(&mut self, name: &str, kind: ComponentKind) -> PlanResult<&PomComponent> {
        if name.trim().is_empty() {
            return Err(PlanError::invalid_format(name, "component name cannot be empty"));
        }
        if !is_single_line(name) {
            return Err(PlanError::invalid_format(name, "component name must be a single line"));
        }
        if self.components.contains_key(name) {
            return Err(PlanError::duplicate(name, "component"));
        }
        tracing::debug!(component = name, kind = kind.label(), "added component");
        let entry = self
            .components
            .entry(name.to_string())
            .or_insert_with(|| PomComponent::new(name, kind));
        Ok(entry)
    }

    /// Look up a component
    #[inline]
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&PomComponent> {
        self.components.get(name)
    }

    /// Check whether a component exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Components in insertion order
    pub fn components(&self) -> impl ExactSizeIterator<Item = &PomComponent> + '_ {
        self.components.values()
    }

    /// Number of components
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when the catalog has no components
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Register a selector and assign it to `component`
    ///
    /// # Errors
    /// - `UnknownComponent` if `component` is not catalogued
    /// - `NotOwned` if another component already owns the id
    /// - `Duplicate` if this component already owns it
    /// - `InvalidFormat` per [`SelectorRegistry::register`]
    pub fn add_selector_to_component(&mut self, component: &str, id: &str) -> PlanResult<SelectorId> {
        if !self.components.contains_key(component) {
            return Err(PlanError::unknown_component(component, &format!("selector `{id}`")));
        }
        match self.owners.get(id) {
            Some(owner) if owner == component => {
                return Err(PlanError::new(
                    ErrorKind::Duplicate,
                    id,
                    format!("selector `{id}` is already declared by `{component}`"),
                ));
            }
            Some(owner) => {
                tracing::warn!(selector = id, owner = %owner, claimant = component, "selector ownership conflict");
                return Err(PlanError::new(
                    ErrorKind::NotOwned,
                    id,
                    format!(
                        "selector `{id}` is owned by `{owner}`; `{component}` must reach it through a dependency"
                    ),
                ));
            }
            None => {}
        }

        let selector = self.registry.register(id)?;
        self.owners.insert(selector.clone(), component.to_string());
        if let Some(entry) = self.components.get_mut(component) {
            entry.selectors.insert(selector.clone());
        }
        Ok(selector)
    }

    /// Component that owns a selector
    #[inline]
    #[must_use]
    pub fn owner_of(&self, selector: &str) -> Option<&str> {
        self.owners.get(selector).map(String::as_str)
    }

    /// Declare that `from` depends on `to`
    ///
    /// Re-adding an existing edge is a no-op.
    ///
    /// # Errors
    /// - `UnknownComponent` if either endpoint is missing
    /// - `CycleDetected` if the edge would close a cycle; the catalog is left
    ///   unchanged
    pub fn add_dependency(&mut self, from: &str, to: &str) -> PlanResult<()> {
        for endpoint in [from, to] {
            if !self.components.contains_key(endpoint) {
                let referrer = format!("dependency `{from} -> {to}`");
                return Err(PlanError::unknown_component(endpoint, &referrer));
            }
        }
        if from == to {
            return Err(PlanError::new(
                ErrorKind::CycleDetected,
                from,
                format!("`{from}` cannot depend on itself"),
            ));
        }
        if self.components[from].dependencies.contains(to) {
            return Ok(());
        }

        // Tentatively add the edge, then roll it back if a cycle appears
        if let Some(entry) = self.components.get_mut(from) {
            entry.dependencies.insert(to.to_string());
        }
        if let Some(cycle) = self.find_cycle() {
            if let Some(entry) = self.components.get_mut(from) {
                entry.dependencies.shift_remove(to);
            }
            tracing::warn!(from, to, "rejected dependency edge");
            return Err(PlanError::new(
                ErrorKind::CycleDetected,
                from,
                format!(
                    "dependency `{from} -> {to}` closes the cycle {}",
                    rotate_cycle(cycle, from).join(" -> ")
                ),
            ));
        }

        tracing::debug!(from, to, "added dependency");
        Ok(())
    }

    /// True when the dependency graph has no cycle
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.find_cycle().is_none()
    }

    /// Depth-first search marking components unvisited / in-progress / done.
    /// Reaching an in-progress component means the stack holds a cycle.
    fn find_cycle(&self) -> Option<Vec<String>> {
        fn visit<'a>(
            name: &'a str,
            components: &'a IndexMap<String, PomComponent>,
            marks: &mut HashMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            match marks.get(name).copied().unwrap_or(Mark::Unvisited) {
                Mark::Done => return None,
                Mark::InProgress => {
                    let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..].iter().map(|n| (*n).to_string()).collect();
                    cycle.push(name.to_string());
                    return Some(cycle);
                }
                Mark::Unvisited => {}
            }

            marks.insert(name, Mark::InProgress);
            stack.push(name);
            if let Some(component) = components.get(name) {
                for dep in &component.dependencies {
                    if let Some(cycle) = visit(dep.as_str(), components, marks, stack) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(self.components.len());
        let mut stack = Vec::new();
        for name in self.components.keys() {
            if let Some(cycle) = visit(name.as_str(), &self.components, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    /// The component itself plus everything reachable through dependencies,
    /// in discovery order. Empty if the component is unknown.
    #[must_use]
    pub fn reachable_from(&self, name: &str) -> IndexSet<&str> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let Some((_, key, _)) = self.components.get_full(name) else {
            return seen;
        };
        let mut pending = vec![key.as_str()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(component) = self.components.get(current) {
                pending.extend(component.dependencies.iter().rev().map(String::as_str));
            }
        }
        seen
    }

    /// Whether `selector` is owned by `component` or one of its transitive dependencies
    #[must_use]
    pub fn is_reachable_selector(&self, component: &str, selector: &str) -> bool {
        self.owner_of(selector)
            .is_some_and(|owner| self.reachable_from(component).contains(owner))
    }

    /// Add a method to a component
    ///
    /// All problems with the signature are reported together.
    ///
    /// # Errors
    /// - `UnknownComponent` if the component or the return target is missing
    /// - `Duplicate` on a repeated method name
    /// - `UnknownSelectorTarget` for each selector outside the component's reach
    pub fn add_method(&mut self, component: &str, signature: MethodSignature) -> Result<(), Diagnostics> {
        let entity = format!("{component}.{}", signature.name);
        let Some(owner) = self.components.get(component) else {
            return Err(PlanError::unknown_component(component, &format!("method `{entity}`")).into());
        };

        let mut diags = Diagnostics::new();
        if signature.name.trim().is_empty() {
            diags.push(PlanError::invalid_format(&entity, "method name cannot be empty"));
        }
        if !is_single_line(&signature.name) || signature.params.iter().any(|p| !is_single_line(&p.name)) {
            diags.push(PlanError::invalid_format(&entity, "method and parameter names must be single lines"));
        }
        if owner.methods.iter().any(|m| m.name == signature.name) {
            diags.push(PlanError::duplicate(&entity, "method"));
        }
        if let Some(target) = signature.returns.target() {
            if !self.components.contains_key(target) {
                diags.push(PlanError::unknown_component(target, &format!("return type of `{entity}`")));
            }
        }

        let reach = self.reachable_from(component);
        for selector in &signature.selectors {
            let reachable = self.owner_of(selector).is_some_and(|o| reach.contains(o));
            if !reachable {
                let detail = match self.owner_of(selector) {
                    Some(other) => format!(
                        "`{entity}` targets `{selector}`, owned by `{other}` which `{component}` does not depend on"
                    ),
                    None => format!("`{entity}` targets `{selector}`, which no component declares"),
                };
                diags.push(PlanError::new(ErrorKind::UnknownSelectorTarget, selector.as_str(), detail));
            }
        }

        if !diags.is_empty() {
            return Err(diags);
        }
        if let Some(entry) = self.components.get_mut(component) {
            entry.methods.push(signature);
        }
        Ok(())
    }
}

impl Default for PageObjectCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `text` has no line breaks or other control characters
#[must_use]
pub fn is_single_line(text: &str) -> bool {
    !text.chars().any(char::is_control)
}

/// Re-anchor a closed path `[x0, .., xk, x0]` so it starts and ends at `start`
fn rotate_cycle(mut cycle: Vec<String>, start: &str) -> Vec<String> {
    cycle.pop();
    if let Some(pos) = cycle.iter().position(|n| n == start) {
        cycle.rotate_left(pos);
    }
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn login_catalog() -> PageObjectCatalog {
        let mut catalog = PageObjectCatalog::new();
        catalog.add_component("Topbar", ComponentKind::Component).unwrap();
        catalog.add_component("LoginPage", ComponentKind::Page).unwrap();
        catalog.add_component("DashboardPage", ComponentKind::Page).unwrap();
        catalog.add_selector_to_component("Topbar", "topbar-user-avatar").unwrap();
        catalog.add_selector_to_component("LoginPage", "login-email-input").unwrap();
        catalog.add_selector_to_component("LoginPage", "login-submit-button").unwrap();
        catalog.add_dependency("DashboardPage", "Topbar").unwrap();
        catalog
    }

    #[test]
    fn add_component_rejects_duplicate() {
        let mut catalog = PageObjectCatalog::new();
        catalog.add_component("LoginPage", ComponentKind::Page).unwrap();

        let err = catalog.add_component("LoginPage", ComponentKind::Component).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Duplicate);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.component("LoginPage").unwrap().kind(), ComponentKind::Page);
    }

    #[test]
    fn add_component_rejects_blank_name() {
        let mut catalog = PageObjectCatalog::new();
        let err = catalog.add_component("  ", ComponentKind::Page).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn multi_line_names_are_invalid() {
        let mut catalog = login_catalog();
        let err = catalog.add_component("Home\n## Page", ComponentKind::Page).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
        assert!(!catalog.contains("Home\n## Page"));

        let method = MethodSignature::new("open").with_param("url\tpath", ParamType::String);
        let diags = catalog.add_method("LoginPage", method).unwrap_err();
        assert_eq!(diags.count(ErrorKind::InvalidFormat), 1);
        assert!(catalog.component("LoginPage").unwrap().methods().is_empty());
    }

    #[test]
    fn selector_owned_elsewhere_is_not_owned() {
        let mut catalog = login_catalog();
        let err = catalog
            .add_selector_to_component("DashboardPage", "topbar-user-avatar")
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotOwned);
        assert_eq!(catalog.owner_of("topbar-user-avatar"), Some("Topbar"));
        assert!(!catalog.component("DashboardPage").unwrap().owns("topbar-user-avatar"));
    }

    #[test]
    fn selector_redeclared_by_owner_is_duplicate() {
        let mut catalog = login_catalog();
        let err = catalog
            .add_selector_to_component("LoginPage", "login-email-input")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Duplicate);
    }

    #[test]
    fn selector_on_unknown_component() {
        let mut catalog = PageObjectCatalog::new();
        let err = catalog.add_selector_to_component("Ghost", "ghost-button").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownComponent);
        assert!(!catalog.registry().exists("ghost-button"));
    }

    #[test]
    fn two_step_cycle_is_rejected_and_rolled_back() {
        let mut catalog = PageObjectCatalog::new();
        catalog.add_component("A", ComponentKind::Page).unwrap();
        catalog.add_component("B", ComponentKind::Page).unwrap();
        catalog.add_dependency("A", "B").unwrap();
        let before = catalog.clone();

        let err = catalog.add_dependency("B", "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);
        assert!(err.message.contains("B -> A -> B"));
        assert_eq!(catalog, before);
        assert!(catalog.is_acyclic());
    }

    #[test]
    fn long_cycle_is_rejected() {
        let mut catalog = PageObjectCatalog::new();
        for name in ["A", "B", "C", "D"] {
            catalog.add_component(name, ComponentKind::Component).unwrap();
        }
        catalog.add_dependency("A", "B").unwrap();
        catalog.add_dependency("B", "C").unwrap();
        catalog.add_dependency("C", "D").unwrap();

        let err = catalog.add_dependency("D", "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);
        assert_eq!(catalog.component("D").unwrap().dependencies().count(), 0);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut catalog = PageObjectCatalog::new();
        catalog.add_component("A", ComponentKind::Page).unwrap();
        let err = catalog.add_dependency("A", "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut catalog = PageObjectCatalog::new();
        for name in ["Page", "Left", "Right", "Shared"] {
            catalog.add_component(name, ComponentKind::Component).unwrap();
        }
        catalog.add_dependency("Page", "Left").unwrap();
        catalog.add_dependency("Page", "Right").unwrap();
        catalog.add_dependency("Left", "Shared").unwrap();
        catalog.add_dependency("Right", "Shared").unwrap();

        assert!(catalog.is_acyclic());
        let reach: Vec<&str> = catalog.reachable_from("Page").into_iter().collect();
        assert_eq!(reach, ["Page", "Left", "Shared", "Right"]);
    }

    #[test]
    fn dependency_on_unknown_component() {
        let mut catalog = login_catalog();
        let err = catalog.add_dependency("LoginPage", "Footer").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownComponent);
        assert_eq!(err.entity, "Footer");
    }

    #[test]
    fn repeated_edge_is_noop() {
        let mut catalog = login_catalog();
        catalog.add_dependency("DashboardPage", "Topbar").unwrap();
        assert_eq!(catalog.component("DashboardPage").unwrap().dependencies().count(), 1);
    }

    #[test]
    fn method_reaches_dependency_selector() {
        let mut catalog = login_catalog();
        let method = MethodSignature::new("openUserMenu").touching(["topbar-user-avatar"]);
        catalog.add_method("DashboardPage", method).unwrap();
        assert!(catalog.is_reachable_selector("DashboardPage", "topbar-user-avatar"));
    }

    #[test]
    fn method_outside_reach_is_rejected() {
        let mut catalog = login_catalog();
        let method = MethodSignature::new("clickAvatar").touching(["topbar-user-avatar", "missing-button"]);

        let diags = catalog.add_method("LoginPage", method).unwrap_err();
        assert_eq!(diags.count(ErrorKind::UnknownSelectorTarget), 2);
        assert!(catalog.component("LoginPage").unwrap().methods().is_empty());
    }

    #[test]
    fn method_returning_unknown_component() {
        let mut catalog = login_catalog();
        let method = MethodSignature::new("submit").returning("SettingsPage");

        let diags = catalog.add_method("LoginPage", method).unwrap_err();
        assert_eq!(diags.count(ErrorKind::UnknownComponent), 1);
    }

    #[test]
    fn duplicate_method_name() {
        let mut catalog = login_catalog();
        catalog.add_method("LoginPage", MethodSignature::new("submit")).unwrap();
        let diags = catalog.add_method("LoginPage", MethodSignature::new("submit")).unwrap_err();
        assert_eq!(diags.count(ErrorKind::Duplicate), 1);
    }

    #[test]
    fn method_signature_display() {
        let method = MethodSignature::new("login")
            .with_param("email", ParamType::String)
            .with_param("remember", ParamType::Boolean)
            .returning("DashboardPage");
        assert_eq!(method.to_string(), "login(email: string, remember: boolean): DashboardPage");
        assert_eq!(MethodSignature::new("logout").to_string(), "logout(): void");
    }

    #[test]
    fn return_type_from_string() {
        assert_eq!(ReturnType::from("void".to_string()), ReturnType::Void);
        assert_eq!(ReturnType::from(String::new()), ReturnType::Void);
        assert_eq!(
            ReturnType::from("DashboardPage".to_string()),
            ReturnType::Component("DashboardPage".into())
        );
    }

    #[test]
    fn component_spec_deserializes_camel_case() {
        let json = r#"{
            "name": "LoginPage",
            "kind": "page",
            "selectors": ["login-email-input"],
            "methods": [
                {"name": "submit", "returns": "DashboardPage", "selectors": ["login-email-input"]},
                {"name": "fillEmail", "params": [{"name": "email", "type": "string"}]}
            ],
            "dependsOn": ["Topbar"]
        }"#;
        let spec: ComponentSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.depends_on, ["Topbar"]);
        assert_eq!(spec.methods[0].returns.target(), Some("DashboardPage"));
        assert_eq!(spec.methods[1].returns, ReturnType::Void);
        assert_eq!(spec.methods[1].params[0].ty, ParamType::String);
    }
}
