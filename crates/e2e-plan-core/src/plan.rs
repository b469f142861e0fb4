//! Validated plan
//!
//! [`Plan`] is sealed: the only way to construct one is
//! [`crate::PlanAggregator::build_plan`], which seals it after every check
//! has passed. A plan can still be deserialized from storage, so derived
//! data is bound to content by a SHA-256 validation hash and
//! [`Plan::verify`] rebuilds the plan before it is trusted.

use crate::aggregator::PlanAggregator;
use crate::options::BuildOptions;
use e2e_plan_model::{
    ComponentKind, ComponentSpec, PageObjectCatalog, PlanError, PlanResult, PomComponent, Priority, Scenario,
    ScenarioBook, ScenarioSpec,
};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Scenario names grouped by priority tier
///
/// All four tiers are always present; within a tier, scenarios keep their
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizationMatrix {
    tiers: BTreeMap<Priority, Vec<String>>,
}

impl PrioritizationMatrix {
    /// Group a scenario book by priority
    #[must_use]
    pub fn from_scenarios(scenarios: &ScenarioBook) -> Self {
        let mut tiers: BTreeMap<Priority, Vec<String>> = Priority::ALL.iter().map(|p| (*p, Vec::new())).collect();
        for scenario in scenarios.iter() {
            tiers
                .entry(scenario.priority())
                .or_default()
                .push(scenario.name().to_string());
        }
        Self { tiers }
    }

    /// Scenario names in one tier
    #[must_use]
    pub fn tier(&self, priority: Priority) -> &[String] {
        self.tiers.get(&priority).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tiers from P0 to P3
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &[String])> + '_ {
        self.tiers.iter().map(|(p, names)| (*p, names.as_slice()))
    }

    /// Number of scenarios across all tiers
    #[must_use]
    pub fn total(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }
}

/// One implementation phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// 1-based phase number
    pub number: usize,
    /// Tier implemented in this phase
    pub priority: Priority,
    /// Phase heading
    pub title: String,
    /// Scenario names, in matrix order
    pub scenarios: Vec<String>,
}

impl Phase {
    /// Fixed heading for the phase covering `priority`
    #[must_use]
    pub const fn title_for(priority: Priority) -> &'static str {
        match priority {
            Priority::P0 => "Critical Path",
            Priority::P1 => "Core Features",
            Priority::P2 => "Secondary Features",
            Priority::P3 => "Edge Cases & Polish",
        }
    }
}

/// Ordered implementation phases, one per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    phases: Vec<Phase>,
}

impl Roadmap {
    /// Derive the four phases from a matrix; empty tiers still get a phase
    #[must_use]
    pub fn from_matrix(matrix: &PrioritizationMatrix) -> Self {
        let phases = Priority::ALL
            .iter()
            .enumerate()
            .map(|(i, priority)| Phase {
                number: i + 1,
                priority: *priority,
                title: Phase::title_for(*priority).to_string(),
                scenarios: matrix.tier(*priority).to_vec(),
            })
            .collect();
        Self { phases }
    }

    /// Phases in order
    #[inline]
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

/// Headline counts for a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Routed pages
    pub pages: usize,
    /// Embedded components
    pub components: usize,
    /// Registered selectors
    pub selectors: usize,
    /// Methods across all components
    pub methods: usize,
    /// Scenarios
    pub scenarios: usize,
    /// Scenarios per tier, P0 first
    pub per_priority: [usize; 4],
}

/// Validated end-to-end test plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    title: String,
    catalog: PageObjectCatalog,
    scenarios: ScenarioBook,
    matrix: PrioritizationMatrix,
    roadmap: Roadmap,
    validation_hash: String,
}

impl Plan {
    /// Seal a plan whose catalog and scenarios have passed validation
    pub(crate) fn seal(title: String, catalog: PageObjectCatalog, scenarios: ScenarioBook) -> Self {
        let matrix = PrioritizationMatrix::from_scenarios(&scenarios);
        let roadmap = Roadmap::from_matrix(&matrix);
        let validation_hash = compute_validation_hash(&title, &catalog, &scenarios);
        Self {
            title,
            catalog,
            scenarios,
            matrix,
            roadmap,
            validation_hash,
        }
    }

    /// Plan title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page object catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &PageObjectCatalog {
        &self.catalog
    }

    /// Scenarios in insertion order
    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &ScenarioBook {
        &self.scenarios
    }

    /// Look up a scenario
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    /// Scenario names by tier
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &PrioritizationMatrix {
        &self.matrix
    }

    /// Implementation phases
    #[inline]
    #[must_use]
    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    /// Hex SHA-256 over the plan content
    #[inline]
    #[must_use]
    pub fn validation_hash(&self) -> &str {
        &self.validation_hash
    }

    /// Headline counts
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let mut per_priority = [0usize; 4];
        for (priority, names) in self.matrix.iter() {
            per_priority[priority.rank()] = names.len();
        }
        let pages = self
            .catalog
            .components()
            .filter(|c| c.kind() == ComponentKind::Page)
            .count();
        PlanSummary {
            pages,
            components: self.catalog.len() - pages,
            selectors: self.catalog.registry().len(),
            methods: self.catalog.components().map(|c| c.methods().len()).sum(),
            scenarios: self.scenarios.len(),
            per_priority,
        }
    }

    /// Component names with every dependency before its dependents
    ///
    /// # Errors
    /// `IncompletePlan` if the dependency graph has a cycle, which only a
    /// tampered plan can contain.
    pub fn implementation_order(&self) -> PlanResult<Vec<&str>> {
        let graph = dependency_graph(&self.catalog);
        toposort(&graph, None)
            .map(|order| order.into_iter().map(|ix| graph[ix]).collect())
            .map_err(|cycle| {
                let name = graph[cycle.node_id()];
                PlanError::incomplete_plan(name, format!("dependency cycle through `{name}`"))
            })
    }

    /// Re-check every invariant against the stored content
    ///
    /// The stored components and scenarios are rebuilt from scratch with
    /// the stored title and reserved prefixes; the result must equal this
    /// plan.
    ///
    /// # Errors
    /// `IncompletePlan` naming the first failed check.
    pub fn verify(&self) -> PlanResult<()> {
        let expected = compute_validation_hash(&self.title, &self.catalog, &self.scenarios);
        if expected != self.validation_hash {
            return Err(PlanError::incomplete_plan(
                &self.title,
                "validation hash does not match plan content",
            ));
        }
        if self.matrix != PrioritizationMatrix::from_scenarios(&self.scenarios) {
            return Err(PlanError::incomplete_plan(
                &self.title,
                "prioritization matrix does not cover the scenarios",
            ));
        }
        if self.roadmap != Roadmap::from_matrix(&self.matrix) {
            return Err(PlanError::incomplete_plan(
                &self.title,
                "roadmap does not match the prioritization matrix",
            ));
        }

        let components: Vec<ComponentSpec> = self.catalog.components().map(PomComponent::to_spec).collect();
        let scenarios: Vec<ScenarioSpec> = self.scenarios.iter().map(Scenario::to_spec).collect();
        let options = BuildOptions::default()
            .with_title(self.title.as_str())
            .with_reserved_prefixes(self.catalog.registry().reserved_prefixes().iter().cloned())
            .with_parallel(false);
        let rebuilt = PlanAggregator::new(options)
            .build_plan(&components, &scenarios)
            .map_err(|diags| {
                PlanError::incomplete_plan(&self.title, format!("plan no longer validates: {diags}"))
            })?;
        if rebuilt != *self {
            return Err(PlanError::incomplete_plan(
                &self.title,
                "plan content differs from a fresh build of its components and scenarios",
            ));
        }
        Ok(())
    }
}

/// Dependency graph with edges pointing from a dependency to its dependent
pub(crate) fn dependency_graph(catalog: &PageObjectCatalog) -> DiGraph<&str, ()> {
    let mut graph = DiGraph::with_capacity(catalog.len(), 0);
    let index: HashMap<&str, NodeIndex> = catalog
        .components()
        .map(|c| (c.name(), graph.add_node(c.name())))
        .collect();
    for component in catalog.components() {
        for dep in component.dependencies() {
            if let (Some(&from), Some(&to)) = (index.get(dep), index.get(component.name())) {
                graph.add_edge(from, to, ());
            }
        }
    }
    graph
}

/// Independent acyclicity check over the whole catalog
pub(crate) fn has_dependency_cycle(catalog: &PageObjectCatalog) -> bool {
    let graph = dependency_graph(catalog);
    is_cyclic_directed(&graph)
}

/// Compute the validation hash for plan content
///
/// Every field is written in declaration order followed by a NUL separator,
/// so the hash changes whenever any content changes.
#[must_use]
pub fn compute_validation_hash(title: &str, catalog: &PageObjectCatalog, scenarios: &ScenarioBook) -> String {
    use sha2::{Digest, Sha256};

    fn field(hasher: &mut Sha256, value: &str) {
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }

    let mut hasher = Sha256::new();
    let h = &mut hasher;

    field(h, title);
    for prefix in catalog.registry().reserved_prefixes() {
        field(h, prefix);
    }
    for selector in catalog.registry().all_ids() {
        field(h, selector.as_str());
    }

    for component in catalog.components() {
        field(h, component.name());
        field(h, component.kind().label());
        for selector in component.selectors() {
            field(h, selector.as_str());
        }
        for method in component.methods() {
            field(h, &method.to_string());
            for selector in &method.selectors {
                field(h, selector);
            }
        }
        for dep in component.dependencies() {
            field(h, dep);
        }
    }

    for scenario in scenarios.iter() {
        field(h, scenario.name());
        field(h, scenario.priority().label());
        field(h, scenario.category());
        for precondition in scenario.preconditions() {
            field(h, precondition);
        }
        for step in scenario.steps() {
            field(h, step.action());
            field(h, step.target().map_or("", |t| t.as_str()));
            field(h, step.navigates_to().unwrap_or(""));
        }
        for result in scenario.expected_results() {
            field(h, &result.text);
            field(h, if result.critical { "critical" } else { "" });
        }
        for component in scenario.required_components() {
            field(h, component);
        }
        for selector in scenario.required_selectors() {
            field(h, selector.as_str());
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2e_plan_model::{ErrorKind, MethodSignature, StepSpec};
    use pretty_assertions::assert_eq;

    fn small_plan() -> Plan {
        let mut catalog = PageObjectCatalog::new();
        catalog.add_component("Shell", ComponentKind::Component).unwrap();
        catalog.add_component("HomePage", ComponentKind::Page).unwrap();
        catalog.add_selector_to_component("Shell", "shell-menu-button").unwrap();
        catalog.add_dependency("HomePage", "Shell").unwrap();

        let mut book = ScenarioBook::new();
        for (name, priority) in [("Open menu", Priority::P2), ("Land", Priority::P2), ("Boot", Priority::P0)] {
            let spec = ScenarioSpec::new(name, priority)
                .with_step(StepSpec::action("Click menu").on("shell-menu-button"))
                .expecting_critical("Menu opens")
                .requiring_components(["HomePage"]);
            book.create_scenario(&catalog, spec).unwrap();
        }
        Plan::seal("Demo".to_string(), catalog, book)
    }

    #[test]
    fn matrix_keeps_all_tiers_and_insertion_order() {
        let plan = small_plan();
        assert_eq!(plan.matrix().tier(Priority::P2), ["Open menu", "Land"]);
        assert_eq!(plan.matrix().tier(Priority::P0), ["Boot"]);
        assert!(plan.matrix().tier(Priority::P1).is_empty());
        assert_eq!(plan.matrix().iter().count(), 4);
        assert_eq!(plan.matrix().total(), 3);
    }

    #[test]
    fn roadmap_emits_empty_phases() {
        let plan = small_plan();
        let titles: Vec<&str> = plan.roadmap().phases().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Critical Path", "Core Features", "Secondary Features", "Edge Cases & Polish"]
        );
        assert!(plan.roadmap().phases()[3].scenarios.is_empty());
        assert_eq!(plan.roadmap().phases()[2].number, 3);
    }

    #[test]
    fn implementation_order_puts_dependencies_first() {
        let plan = small_plan();
        assert_eq!(plan.implementation_order().unwrap(), ["Shell", "HomePage"]);
    }

    #[test]
    fn summary_counts() {
        let summary = small_plan().summary();
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.components, 1);
        assert_eq!(summary.selectors, 1);
        assert_eq!(summary.scenarios, 3);
        assert_eq!(summary.per_priority, [1, 0, 2, 0]);
    }

    #[test]
    fn verify_accepts_sealed_plan() {
        assert!(small_plan().verify().is_ok());
    }

    #[test]
    fn verify_rejects_edited_content() {
        let plan = small_plan();
        let mut json = serde_json::to_value(&plan).unwrap();
        json["title"] = serde_json::Value::String("Edited".into());
        let edited: Plan = serde_json::from_value(json).unwrap();

        let err = edited.verify().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompletePlan);
        assert!(err.message.contains("validation hash"));
    }

    #[test]
    fn verify_rejects_rehashed_reserved_selector() {
        let plan = small_plan();
        let mut json = serde_json::to_value(&plan).unwrap();
        let catalog = &mut json["catalog"];
        catalog["registry"]["ids"].as_array_mut().unwrap().push("data-evil".into());
        catalog["components"]["Shell"]["selectors"]
            .as_array_mut()
            .unwrap()
            .push("data-evil".into());
        catalog["owners"]["data-evil"] = "Shell".into();

        let mut edited: Plan = serde_json::from_value(json).unwrap();
        edited.validation_hash = compute_validation_hash(&edited.title, &edited.catalog, &edited.scenarios);
        assert_ne!(edited.validation_hash, plan.validation_hash);

        let err = edited.verify().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompletePlan);
        assert!(err.message.contains("data-evil"), "{}", err.message);
    }

    #[test]
    fn verify_rejects_sealed_undeclared_transition() {
        let mut catalog = small_plan().catalog;
        catalog
            .add_method("Shell", MethodSignature::new("goHome").returning("HomePage"))
            .unwrap();
        let plan = Plan::seal("Demo".to_string(), catalog, small_plan().scenarios);

        let err = plan.verify().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompletePlan);
        assert!(err.message.contains("Shell.goHome"), "{}", err.message);
    }

    #[test]
    fn hash_is_stable() {
        let a = small_plan();
        let b = small_plan();
        assert_eq!(a.validation_hash(), b.validation_hash());
        assert_eq!(a.validation_hash().len(), 64);
    }
}
