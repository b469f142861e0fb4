//! Testing utilities for the E2E plan workspace
//!
//! Shared fixtures: a small login application with a shared `Topbar`,
//! and the scenarios that exercise it.

#![allow(missing_docs)]

use e2e_plan_core::{build_plan, Plan};
use e2e_plan_model::{ComponentSpec, MethodSignature, ParamType, Priority, ScenarioSpec, StepSpec};

pub const LOGIN_SELECTORS: [&str; 4] = [
    "login-email-input",
    "login-password-input",
    "login-submit-button",
    "topbar-user-avatar",
];

pub fn topbar() -> ComponentSpec {
    ComponentSpec::component("Topbar")
        .with_selectors(["topbar-user-avatar", "topbar-logout-button"])
        .with_method(MethodSignature::new("openUserMenu").touching(["topbar-user-avatar"]))
        .with_method(
            MethodSignature::new("logout")
                .returning("LoginPage")
                .touching(["topbar-user-avatar", "topbar-logout-button"]),
        )
}

pub fn login_page() -> ComponentSpec {
    ComponentSpec::page("LoginPage")
        .with_selectors([
            "login-email-input",
            "login-password-input",
            "login-submit-button",
            "login-error-message",
        ])
        .with_method(
            MethodSignature::new("fillEmail")
                .with_param("email", ParamType::String)
                .touching(["login-email-input"]),
        )
        .with_method(
            MethodSignature::new("fillPassword")
                .with_param("password", ParamType::String)
                .touching(["login-password-input"]),
        )
        .with_method(
            MethodSignature::new("submit")
                .returning("DashboardPage")
                .touching(["login-submit-button"]),
        )
        .with_method(
            MethodSignature::new("login")
                .with_param("email", ParamType::String)
                .with_param("password", ParamType::String)
                .returning("DashboardPage")
                .touching(["login-email-input", "login-password-input", "login-submit-button"]),
        )
}

pub fn dashboard_page() -> ComponentSpec {
    ComponentSpec::page("DashboardPage")
        .with_selectors(["dashboard-welcome-banner", "dashboard-search-input"])
        .depends_on(["Topbar"])
        .with_method(
            MethodSignature::new("search")
                .with_param("query", ParamType::String)
                .touching(["dashboard-search-input"]),
        )
}

/// Components in an order that declares dependents before dependencies
pub fn login_components() -> Vec<ComponentSpec> {
    vec![login_page(), dashboard_page(), topbar()]
}

pub fn user_login() -> ScenarioSpec {
    ScenarioSpec::new("User Login", Priority::P0)
        .in_category("Authentication")
        .with_precondition("A registered user exists")
        .with_step("Navigate to login page")
        .with_step(StepSpec::action("Enter valid email").on("login-email-input"))
        .with_step(StepSpec::action("Enter valid password").on("login-password-input"))
        .with_step(
            StepSpec::action("Click submit button")
                .on("login-submit-button")
                .navigates_to("DashboardPage"),
        )
        .expecting_critical("User is redirected to dashboard")
        .expecting("User avatar is shown in the top bar")
        .requiring_components(["LoginPage", "DashboardPage", "Topbar"])
        .requiring_selectors(LOGIN_SELECTORS)
}

pub fn failed_login() -> ScenarioSpec {
    ScenarioSpec::new("Failed Login", Priority::P1)
        .in_category("Authentication")
        .with_step("Navigate to login page")
        .with_step(StepSpec::action("Enter an unknown email").on("login-email-input"))
        .with_step(StepSpec::action("Click submit button").on("login-submit-button"))
        .expecting("Error message is displayed")
        .requiring_components(["LoginPage"])
        .requiring_selectors(["login-error-message"])
}

pub fn logout() -> ScenarioSpec {
    ScenarioSpec::new("Logout", Priority::P1)
        .in_category("Authentication")
        .with_precondition("User is logged in")
        .with_step(StepSpec::action("Open user menu").on("topbar-user-avatar"))
        .with_step(
            StepSpec::action("Click logout")
                .on("topbar-logout-button")
                .navigates_to("LoginPage"),
        )
        .expecting("Login form is shown")
        .requiring_components(["DashboardPage"])
        .requiring_selectors(["topbar-user-avatar", "topbar-logout-button"])
}

pub fn dashboard_search() -> ScenarioSpec {
    ScenarioSpec::new("Dashboard Search", Priority::P2)
        .in_category("Search")
        .with_precondition("User is logged in")
        .with_step(StepSpec::action("Type a query").on("dashboard-search-input"))
        .with_step("Press enter")
        .expecting("Matching results are listed")
        .requiring_components(["DashboardPage"])
        .requiring_selectors(["dashboard-search-input"])
}

pub fn login_scenarios() -> Vec<ScenarioSpec> {
    vec![user_login(), failed_login(), logout(), dashboard_search()]
}

/// The login fixture without the named component
pub fn without_component(name: &str) -> Vec<ComponentSpec> {
    login_components().into_iter().filter(|c| c.name != name).collect()
}

/// Built login plan
pub fn login_plan() -> Plan {
    build_plan(&login_components(), &login_scenarios()).expect("login fixture is valid")
}

/// The login fixture as a YAML plan document
pub const LOGIN_DOCUMENT_YAML: &str = r#"title: Acme Web App
components:
  - name: LoginPage
    kind: page
    selectors: [login-email-input, login-password-input, login-submit-button]
    methods:
      - name: login
        params:
          - { name: email, type: string }
          - { name: password, type: string }
        returns: DashboardPage
        selectors: [login-email-input, login-password-input, login-submit-button]
  - name: DashboardPage
    kind: page
    selectors: [dashboard-welcome-banner]
    dependsOn: [Topbar]
  - name: Topbar
    kind: component
    selectors: [topbar-user-avatar]
scenarios:
  - name: User Login
    priority: P0
    category: Authentication
    preconditions: [A registered user exists]
    steps:
      - Navigate to login page
      - Enter valid email
      - Enter valid password
      - action: Click submit button
        target: login-submit-button
        navigatesTo: DashboardPage
    expectedResults:
      - text: User is redirected to dashboard
        critical: true
      - Welcome banner is visible
    requiredComponents: [LoginPage, DashboardPage, Topbar]
    requiredSelectors: [login-email-input, login-password-input, login-submit-button, topbar-user-avatar]
"#;
