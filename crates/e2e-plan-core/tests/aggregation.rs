use e2e_plan_core::{build_plan, BuildOptions, PlanAggregator};
use e2e_plan_model::{ComponentSpec, ErrorKind, Priority, ScenarioSpec, StepSpec};
use e2e_plan_test_utils::{
    dashboard_page, login_components, login_page, login_plan, login_scenarios, user_login, without_component,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn consistent_input_builds_without_errors() {
    let plan = build_plan(&login_components(), &login_scenarios()).unwrap();

    assert_eq!(plan.scenarios().len(), 4);
    assert_eq!(plan.matrix().tier(Priority::P0), ["User Login"]);
    assert_eq!(plan.matrix().tier(Priority::P1), ["Failed Login", "Logout"]);
    assert_eq!(plan.matrix().tier(Priority::P2), ["Dashboard Search"]);
    assert!(plan.matrix().tier(Priority::P3).is_empty());
    assert!(plan.verify().is_ok());
}

fn avatar_from_login() -> ScenarioSpec {
    ScenarioSpec::new("Avatar from login", Priority::P2)
        .with_step("Log in")
        .with_step(StepSpec::action("Click avatar").on("topbar-user-avatar"))
        .expecting("User menu opens")
        .requiring_components(["LoginPage"])
}

#[test]
fn removing_a_required_component_yields_one_unknown_component() {
    let mut scenarios = login_scenarios();
    scenarios.push(avatar_from_login().requiring_components(["Topbar"]));
    assert!(build_plan(&login_components(), &scenarios).is_ok());

    for removed in ["LoginPage", "DashboardPage", "Topbar"] {
        let diags = build_plan(&without_component(removed), &scenarios).unwrap_err();

        assert_eq!(diags.len(), 1, "removing {removed}: {diags}");
        let error = diags.iter().next().unwrap();
        assert_eq!(error.kind, ErrorKind::UnknownComponent);
        assert_eq!(error.entity, removed);
    }
}

#[test]
fn step_target_must_be_inside_required_components() {
    let mut scenarios = login_scenarios();
    scenarios.push(avatar_from_login());
    let diags = build_plan(&login_components(), &scenarios).unwrap_err();

    assert_eq!(diags.len(), 1);
    let error = diags.iter().next().unwrap();
    assert_eq!(error.kind, ErrorKind::UnknownSelectorTarget);
    assert_eq!(error.entity, "topbar-user-avatar");
}

#[test]
fn unowned_avatar_in_full_build() {
    let components = vec![
        login_page(),
        dashboard_page(),
        ComponentSpec::component("Topbar").with_selectors(["topbar-logout-button"]),
    ];
    let diags = build_plan(&components, &[user_login()]).unwrap_err();

    assert_eq!(diags.len(), 1);
    let error = diags.iter().next().unwrap();
    assert_eq!(error.kind, ErrorKind::UnreachableSelector);
    assert_eq!(error.entity, "topbar-user-avatar");
}

#[test]
fn cycle_in_input_is_reported() {
    let mut components = login_components();
    components[2] = components[2].clone().depends_on(["DashboardPage"]);

    let diags = build_plan(&components, &login_scenarios()).unwrap_err();
    assert_eq!(diags.count(ErrorKind::CycleDetected), 1);
}

#[test]
fn implementation_order_respects_dependencies() {
    let plan = login_plan();
    let order = plan.implementation_order().unwrap();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();

    assert_eq!(order.len(), 3);
    assert!(position("Topbar") < position("DashboardPage"));
}

#[test]
fn parallel_and_sequential_build_identical_plans() {
    let parallel = PlanAggregator::new(BuildOptions::default())
        .build_plan(&login_components(), &login_scenarios())
        .unwrap();
    let sequential = PlanAggregator::new(BuildOptions::default().with_parallel(false))
        .build_plan(&login_components(), &login_scenarios())
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn plan_round_trips_through_json_and_still_verifies() {
    let plan = login_plan();
    let json = serde_json::to_string(&plan).unwrap();
    let restored: e2e_plan_core::Plan = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, plan);
    assert!(restored.verify().is_ok());
}

proptest! {
    #[test]
    fn prop_matrix_preserves_input_order_within_tier(
        scenarios in Just(login_scenarios()).prop_shuffle()
    ) {
        let plan = build_plan(&login_components(), &scenarios).unwrap();
        for priority in Priority::ALL {
            let expected: Vec<&str> = scenarios
                .iter()
                .filter(|s| s.priority == priority)
                .map(|s| s.name.as_str())
                .collect();
            prop_assert_eq!(plan.matrix().tier(priority), expected.as_slice());
        }
    }
}
