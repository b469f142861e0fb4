//! Plan aggregation
//!
//! Builds a catalog from component specs in passes (components, selectors,
//! dependency edges, methods) so declaration order in the input never
//! matters, validates every scenario against it and seals the result into a
//! [`Plan`]. Every failure across all passes is reported together.

use crate::options::BuildOptions;
use crate::plan::{has_dependency_cycle, Plan};
use e2e_plan_model::{
    is_single_line, validate_scenario, ComponentSpec, Diagnostics, ErrorKind, PageObjectCatalog, PlanError, Scenario, ScenarioBook,
    ScenarioSpec, SelectorRegistry,
};
use rayon::prelude::*;
use std::collections::HashSet;

/// Builds validated plans
#[derive(Debug, Clone, Default)]
pub struct PlanAggregator {
    options: BuildOptions,
}

impl PlanAggregator {
    /// Create an aggregator
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Validate components and scenarios and seal them into a plan
    ///
    /// # Errors
    /// Every validation failure found. Unknown component diagnostics are
    /// collapsed to one per missing name, and reachability failures caused
    /// by a missing dependency are left to that root cause.
    #[tracing::instrument(skip_all, fields(components = components.len(), scenarios = scenarios.len()))]
    pub fn build_plan(&self, components: &[ComponentSpec], scenarios: &[ScenarioSpec]) -> Result<Plan, Diagnostics> {
        let mut diags = Diagnostics::new();
        if !is_single_line(&self.options.title) {
            diags.push(PlanError::invalid_format(
                &self.options.title,
                "plan title must be a single line",
            ));
        }

        let (catalog, tainted) = self.build_catalog(components, &mut diags);
        let book = self.build_scenarios(&catalog, scenarios, &tainted, &mut diags);
        check_transitions(&catalog, scenarios, &mut diags);

        if has_dependency_cycle(&catalog) {
            diags.push(PlanError::new(
                ErrorKind::CycleDetected,
                "catalog",
                "component dependencies form a cycle",
            ));
        }

        diags.collapse(ErrorKind::UnknownComponent);
        if !diags.is_empty() {
            tracing::info!(errors = diags.len(), "plan rejected");
            return Err(diags);
        }

        let plan = Plan::seal(self.options.title.clone(), catalog, book);
        tracing::info!(
            components = plan.catalog().len(),
            scenarios = plan.scenarios().len(),
            hash = plan.validation_hash(),
            "plan built"
        );
        Ok(plan)
    }

    /// Build the catalog; returns it with the names of components whose
    /// reach includes a dependency that could not be resolved
    fn build_catalog(&self, specs: &[ComponentSpec], diags: &mut Diagnostics) -> (PageObjectCatalog, HashSet<String>) {
        let registry = SelectorRegistry::with_reserved_prefixes(self.options.reserved_prefixes.iter().cloned());
        let mut catalog = PageObjectCatalog::with_registry(registry);

        let mut accepted: Vec<&ComponentSpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            match catalog.add_component(&spec.name, spec.kind) {
                Ok(_) => accepted.push(spec),
                Err(err) => diags.push(err),
            }
        }

        for spec in &accepted {
            for selector in &spec.selectors {
                if let Err(err) = catalog.add_selector_to_component(&spec.name, selector) {
                    diags.push(err);
                }
            }
        }

        let mut broken: HashSet<&str> = HashSet::new();
        for spec in &accepted {
            for dep in &spec.depends_on {
                if let Err(err) = catalog.add_dependency(&spec.name, dep) {
                    if err.is(ErrorKind::UnknownComponent) {
                        broken.insert(spec.name.as_str());
                    }
                    diags.push(err);
                }
            }
        }

        let tainted: HashSet<String> = catalog
            .components()
            .filter(|c| {
                catalog
                    .reachable_from(c.name())
                    .iter()
                    .any(|name| broken.contains(name))
            })
            .map(|c| c.name().to_string())
            .collect();

        for spec in &accepted {
            for method in &spec.methods {
                if let Err(mut more) = catalog.add_method(&spec.name, method.clone()) {
                    if tainted.contains(&spec.name) {
                        more.retain(|e| !e.is(ErrorKind::UnknownSelectorTarget));
                    }
                    diags.merge(more);
                }
            }
        }

        tracing::debug!(
            components = catalog.len(),
            selectors = catalog.registry().len(),
            tainted = tainted.len(),
            "catalog built"
        );
        (catalog, tainted)
    }

    /// Validate scenarios, in parallel when enabled; results merge in input order
    fn build_scenarios(
        &self,
        catalog: &PageObjectCatalog,
        specs: &[ScenarioSpec],
        tainted: &HashSet<String>,
        diags: &mut Diagnostics,
    ) -> ScenarioBook {
        let mut seen: HashSet<&str> = HashSet::with_capacity(specs.len());
        let duplicate: Vec<bool> = specs.iter().map(|s| !seen.insert(s.name.trim())).collect();

        let results: Vec<Result<Scenario, Diagnostics>> = if self.options.parallel {
            specs.par_iter().map(|spec| validate_scenario(catalog, spec)).collect()
        } else {
            specs.iter().map(|spec| validate_scenario(catalog, spec)).collect()
        };

        let mut book = ScenarioBook::new();
        for ((spec, result), is_duplicate) in specs.iter().zip(results).zip(duplicate) {
            if is_duplicate {
                diags.push(PlanError::duplicate(spec.name.trim(), "scenario"));
            }
            match result {
                Ok(scenario) if !is_duplicate => {
                    if let Err(err) = book.insert(scenario) {
                        diags.push(err);
                    }
                }
                Ok(_) => {}
                Err(mut more) => {
                    if spec.required_components.iter().any(|c| tainted.contains(c)) {
                        more.retain(|e| !e.is(ErrorKind::UnreachableSelector) && !e.is(ErrorKind::UnknownSelectorTarget));
                    }
                    diags.merge(more);
                }
            }
        }
        book
    }
}

/// Every method that returns a component must be matched by a scenario step
/// navigating to that component
fn check_transitions(catalog: &PageObjectCatalog, scenarios: &[ScenarioSpec], diags: &mut Diagnostics) {
    let declared: HashSet<&str> = scenarios
        .iter()
        .flat_map(|s| s.steps.iter())
        .filter_map(|step| step.navigates_to.as_deref())
        .collect();

    for component in catalog.components() {
        for method in component.methods() {
            let Some(target) = method.returns.target() else {
                continue;
            };
            if !declared.contains(target) {
                diags.push(PlanError::new(
                    ErrorKind::UndeclaredTransition,
                    format!("{}.{}", component.name(), method.name),
                    format!(
                        "`{}` returns `{target}` but no scenario step navigates to `{target}`",
                        method
                    ),
                ));
            }
        }
    }
}

/// Build a plan with default options
///
/// # Errors
/// See [`PlanAggregator::build_plan`].
pub fn build_plan(components: &[ComponentSpec], scenarios: &[ScenarioSpec]) -> Result<Plan, Diagnostics> {
    PlanAggregator::default().build_plan(components, scenarios)
}
