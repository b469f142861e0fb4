use e2e_plan_model::prelude::*;
use pretty_assertions::assert_eq;

const LOGIN_SELECTORS: [(&str, &str); 4] = [
    ("LoginPage", "login-email-input"),
    ("LoginPage", "login-password-input"),
    ("LoginPage", "login-submit-button"),
    ("Topbar", "topbar-user-avatar"),
];

fn login_catalog(skip: Option<&str>) -> PageObjectCatalog {
    let mut catalog = PageObjectCatalog::new();
    catalog.add_component("LoginPage", ComponentKind::Page).unwrap();
    catalog.add_component("DashboardPage", ComponentKind::Page).unwrap();
    catalog.add_component("Topbar", ComponentKind::Component).unwrap();
    for (owner, selector) in LOGIN_SELECTORS {
        if Some(selector) != skip {
            catalog.add_selector_to_component(owner, selector).unwrap();
        }
    }
    catalog
}

fn user_login(priority: Priority) -> ScenarioSpec {
    ScenarioSpec::new("User Login", priority)
        .in_category("Authentication")
        .with_step("Navigate to login page")
        .with_step("Enter valid email")
        .with_step("Enter valid password")
        .with_step("Click submit button")
        .expecting("User is redirected to dashboard")
        .requiring_components(["LoginPage", "DashboardPage", "Topbar"])
        .requiring_selectors(LOGIN_SELECTORS.map(|(_, s)| s))
}

#[test]
fn user_login_succeeds_when_selectors_are_owned() {
    let catalog = login_catalog(None);
    let mut book = ScenarioBook::new();

    let scenario = book
        .create_scenario(&catalog, user_login(Priority::P0).expecting_critical("Session cookie is set"))
        .unwrap();

    assert_eq!(scenario.steps().len(), 4);
    assert_eq!(scenario.steps()[3].index(), 4);
    let selectors: Vec<&str> = scenario.required_selectors().map(SelectorId::as_str).collect();
    assert_eq!(
        selectors,
        [
            "login-email-input",
            "login-password-input",
            "login-submit-button",
            "topbar-user-avatar"
        ]
    );
}

#[test]
fn unowned_avatar_yields_one_unreachable_selector() {
    let catalog = login_catalog(Some("topbar-user-avatar"));
    let mut book = ScenarioBook::new();

    let diags = book
        .create_scenario(&catalog, user_login(Priority::P0).expecting_critical("Session cookie is set"))
        .unwrap_err();

    assert_eq!(diags.len(), 1);
    let error = diags.iter().next().unwrap();
    assert_eq!(error.kind, ErrorKind::UnreachableSelector);
    assert_eq!(error.entity, "topbar-user-avatar");
    assert!(book.is_empty());
}

#[test]
fn critical_assertion_required_only_at_p0() {
    let catalog = login_catalog(None);

    let diags = ScenarioBook::new()
        .create_scenario(&catalog, user_login(Priority::P0))
        .unwrap_err();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.count(ErrorKind::MissingCriticalAssertion), 1);

    assert!(ScenarioBook::new()
        .create_scenario(&catalog, user_login(Priority::P2))
        .is_ok());
}

#[test]
fn shared_component_reached_through_dependency() {
    let mut catalog = login_catalog(None);
    catalog.add_dependency("DashboardPage", "Topbar").unwrap();

    let spec = ScenarioSpec::new("Open profile menu", Priority::P1)
        .with_step(StepSpec::action("Click avatar").on("topbar-user-avatar"))
        .expecting("Profile menu is visible")
        .requiring_components(["DashboardPage"])
        .requiring_selectors(["topbar-user-avatar"]);
    assert!(ScenarioBook::new().create_scenario(&catalog, spec).is_ok());
}

#[test]
fn page_cannot_redeclare_shared_selector() {
    let mut catalog = login_catalog(None);
    let err = catalog
        .add_selector_to_component("DashboardPage", "topbar-user-avatar")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotOwned);
    assert_eq!(catalog.owner_of("topbar-user-avatar"), Some("Topbar"));
}
