//! Markdown rendering
//!
//! The layout is fixed: executive summary, scenario detail blocks in
//! prioritization matrix order, page object class summaries in catalog
//! order, then the roadmap. Rendering is a pure function of the plan.

use e2e_plan_core::Plan;
use e2e_plan_model::{PlanError, PlanResult, Priority, Scenario, SelectorId};
use std::fmt::{self, Write};

/// Placeholder for a tier or phase with no scenarios
pub const EMPTY_TIER: &str = "_No scenarios._";

/// Render a plan to markdown
///
/// # Errors
/// `IncompletePlan` when the plan fails [`Plan::verify`].
pub fn render(plan: &Plan) -> PlanResult<String> {
    if let Err(err) = plan.verify() {
        tracing::warn!(error = %err, "refusing to render plan");
        return Err(err);
    }

    let mut out = String::with_capacity(4096);
    render_plan(&mut out, plan)
        .map_err(|err| PlanError::incomplete_plan(plan.title(), format!("failed to format plan: {err}")))?;

    while out.ends_with("\n\n") {
        out.pop();
    }
    tracing::debug!(bytes = out.len(), "rendered plan");
    Ok(out)
}

fn render_plan(out: &mut String, plan: &Plan) -> fmt::Result {
    writeln!(out, "# {}", plan.title())?;
    writeln!(out)?;
    render_summary(out, plan)?;
    render_scenarios(out, plan)?;
    render_components(out, plan)?;
    render_roadmap(out, plan)
}

fn render_summary(out: &mut String, plan: &Plan) -> fmt::Result {
    let summary = plan.summary();
    let tiers = Priority::ALL
        .iter()
        .map(|p| format!("{p}: {}", summary.per_priority[p.rank()]))
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    writeln!(out, "- **Scenarios:** {} ({tiers})", summary.scenarios)?;
    writeln!(
        out,
        "- **Page objects:** {} page(s), {} component(s)",
        summary.pages, summary.components
    )?;
    writeln!(out, "- **Selectors:** {} `data-testid` hook(s)", summary.selectors)?;
    writeln!(out, "- **Methods:** {}", summary.methods)?;
    if let Ok(order) = plan.implementation_order() {
        if !order.is_empty() {
            writeln!(out, "- **Build order:** {}", order.join(" -> "))?;
        }
    }
    writeln!(out)
}

fn render_scenarios(out: &mut String, plan: &Plan) -> fmt::Result {
    writeln!(out, "## Test Scenarios")?;
    writeln!(out)?;
    for (priority, names) in plan.matrix().iter() {
        writeln!(out, "### {priority} - {}", priority.tier_name())?;
        writeln!(out)?;
        writeln!(out, "_{}_", capitalize(priority.description()))?;
        writeln!(out)?;
        if names.is_empty() {
            writeln!(out, "{EMPTY_TIER}")?;
            writeln!(out)?;
            continue;
        }
        for scenario in names.iter().filter_map(|name| plan.scenario(name)) {
            render_scenario(out, scenario)?;
        }
    }
    Ok(())
}

fn render_scenario(out: &mut String, scenario: &Scenario) -> fmt::Result {
    writeln!(out, "#### {}", scenario.name())?;
    writeln!(out)?;
    writeln!(
        out,
        "- **Priority:** {} ({})",
        scenario.priority(),
        scenario.priority().tier_name()
    )?;
    writeln!(out, "- **Category:** {}", scenario.category())?;
    writeln!(out)?;

    if !scenario.preconditions().is_empty() {
        writeln!(out, "**Preconditions:**")?;
        writeln!(out)?;
        for precondition in scenario.preconditions() {
            writeln!(out, "- {precondition}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "**Steps:**")?;
    writeln!(out)?;
    for step in scenario.steps() {
        write!(out, "{}. {}", step.index(), step.action())?;
        if let Some(target) = step.target() {
            write!(out, " (`{target}`)")?;
        }
        if let Some(page) = step.navigates_to() {
            write!(out, " -> {page}")?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;

    if !scenario.expected_results().is_empty() {
        writeln!(out, "**Expected Results:**")?;
        writeln!(out)?;
        for result in scenario.expected_results() {
            if result.critical {
                writeln!(out, "- **[Critical]** {}", result.text)?;
            } else {
                writeln!(out, "- {}", result.text)?;
            }
        }
        writeln!(out)?;
    }

    let components = code_list(scenario.required_components());
    if !components.is_empty() {
        writeln!(out, "**Required Components:** {components}")?;
        writeln!(out)?;
    }
    let selectors = code_list(scenario.required_selectors().map(SelectorId::as_str));
    if !selectors.is_empty() {
        writeln!(out, "**Required Selectors:** {selectors}")?;
        writeln!(out)?;
    }
    Ok(())
}

fn render_components(out: &mut String, plan: &Plan) -> fmt::Result {
    writeln!(out, "## Page Object Model Classes")?;
    writeln!(out)?;
    if plan.catalog().is_empty() {
        writeln!(out, "_No page objects._")?;
        writeln!(out)?;
        return Ok(());
    }

    for component in plan.catalog().components() {
        writeln!(out, "### {} ({})", component.name(), component.kind())?;
        writeln!(out)?;

        let deps = code_list(component.dependencies());
        if !deps.is_empty() {
            writeln!(out, "**Depends on:** {deps}")?;
            writeln!(out)?;
        }

        if component.selectors().next().is_some() {
            writeln!(out, "**Selectors:**")?;
            writeln!(out)?;
            for selector in component.selectors() {
                writeln!(out, "- `{selector}`")?;
            }
            writeln!(out)?;
        }

        if !component.methods().is_empty() {
            writeln!(out, "**Methods:**")?;
            writeln!(out)?;
            for method in component.methods() {
                writeln!(out, "- `{method}`")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_roadmap(out: &mut String, plan: &Plan) -> fmt::Result {
    writeln!(out, "## Implementation Roadmap")?;
    writeln!(out)?;
    for phase in plan.roadmap().phases() {
        writeln!(out, "### Phase {}: {} ({})", phase.number, phase.title, phase.priority)?;
        writeln!(out)?;
        if phase.scenarios.is_empty() {
            writeln!(out, "{EMPTY_TIER}")?;
        } else {
            for name in &phase.scenarios {
                writeln!(out, "- [ ] {name}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn code_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(|i| format!("`{i}`")).collect::<Vec<_>>().join(", ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
