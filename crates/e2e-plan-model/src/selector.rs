//! Selector registry
//!
//! Provides [`SelectorId`], a validated `data-testid` value, and
//! [`SelectorRegistry`], the per-plan namespace that keeps them unique.
//!
//! # Naming rules
//! - kebab-case: lowercase ASCII letters and digits in hyphen-separated
//!   groups, starting with a letter (`login-submit-button`)
//! - must not start with a reserved prefix (`data-`, `aria-`, ... by default)

use crate::error::{ErrorKind, PlanError, PlanResult};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").expect("kebab-case pattern compiles"));

/// Prefixes that mark a hook other than a test id
pub const DEFAULT_RESERVED_PREFIXES: &[&str] = &["data-", "aria-", "css-", "xpath-"];

/// A validated `data-testid` value
///
/// Construction only checks the kebab-case rule; reserved prefixes and
/// uniqueness are registry concerns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SelectorId(String);

impl SelectorId {
    /// Parse a raw identifier
    ///
    /// # Errors
    /// `InvalidFormat` if the value is empty or not kebab-case.
    pub fn parse(raw: &str) -> PlanResult<Self> {
        if raw.is_empty() {
            return Err(PlanError::invalid_format(raw, "selector id cannot be empty"));
        }
        if !Self::is_kebab_case(raw) {
            return Err(PlanError::invalid_format(
                raw,
                format!("selector id `{raw}` must be kebab-case (e.g. `login-submit-button`)"),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Check the kebab-case rule without allocating
    #[inline]
    #[must_use]
    pub fn is_kebab_case(raw: &str) -> bool {
        KEBAB_CASE.is_match(raw)
    }

    /// Borrow the identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First hyphen-separated group, which conventionally names the owner
    /// (`login` in `login-submit-button`)
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Display for SelectorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SelectorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SelectorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SelectorId {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SelectorId> for String {
    fn from(id: SelectorId) -> Self {
        id.0
    }
}

/// Namespace of registered selector ids, in insertion order
///
/// The registry is purely a namespace: ownership lives in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRegistry {
    ids: IndexSet<SelectorId>,
    reserved_prefixes: Vec<String>,
}

impl SelectorRegistry {
    /// Create an empty registry with the default reserved prefixes
    #[must_use]
    pub fn new() -> Self {
        Self::with_reserved_prefixes(DEFAULT_RESERVED_PREFIXES.iter().copied())
    }

    /// Create an empty registry with custom reserved prefixes
    #[must_use]
    pub fn with_reserved_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: IndexSet::new(),
            reserved_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Reserved prefixes in effect
    #[inline]
    #[must_use]
    pub fn reserved_prefixes(&self) -> &[String] {
        &self.reserved_prefixes
    }

    /// Validate a raw id against format and prefix rules, without registering it
    ///
    /// # Errors
    /// `InvalidFormat` on a malformed id or a reserved prefix.
    pub fn check(&self, raw: &str) -> PlanResult<SelectorId> {
        let id = SelectorId::parse(raw)?;
        if let Some(prefix) = self
            .reserved_prefixes
            .iter()
            .find(|p| !p.is_empty() && raw.starts_with(p.as_str()))
        {
            return Err(PlanError::invalid_format(
                raw,
                format!("selector id `{raw}` uses reserved prefix `{prefix}`"),
            ));
        }
        Ok(id)
    }

    /// Register a new selector id
    ///
    /// # Errors
    /// - `InvalidFormat` if the id is malformed or reserved
    /// - `Duplicate` if it is already registered
    pub fn register(&mut self, raw: &str) -> PlanResult<SelectorId> {
        let id = self.check(raw)?;
        if self.ids.contains(raw) {
            return Err(PlanError::new(
                ErrorKind::Duplicate,
                raw,
                format!("selector `{raw}` is already registered"),
            ));
        }
        self.ids.insert(id.clone());
        tracing::debug!(selector = raw, "registered selector");
        Ok(id)
    }

    /// Check whether an id is registered
    #[inline]
    #[must_use]
    pub fn exists(&self, raw: &str) -> bool {
        self.ids.contains(raw)
    }

    /// Look up the registered id
    #[inline]
    #[must_use]
    pub fn get(&self, raw: &str) -> Option<&SelectorId> {
        self.ids.get(raw)
    }

    /// All ids in insertion order
    pub fn all_ids(&self) -> impl ExactSizeIterator<Item = &SelectorId> + '_ {
        self.ids.iter()
    }

    /// Number of registered ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_kebab_case() {
        for raw in ["login-email-input", "topbar-user-avatar", "step2-next", "a"] {
            assert!(SelectorId::parse(raw).is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in [
            "",
            "Login-Button",
            "login_button",
            "login button",
            "-login",
            "login-",
            "login--button",
            "2fa-input",
            "#login",
        ] {
            let err = SelectorId::parse(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidFormat, "{raw:?}");
        }
    }

    #[test]
    fn scope_is_first_group() {
        let id = SelectorId::parse("login-submit-button").unwrap();
        assert_eq!(id.scope(), "login");
    }

    #[test]
    fn register_preserves_insertion_order() {
        let mut registry = SelectorRegistry::new();
        registry.register("zeta-input").unwrap();
        registry.register("alpha-input").unwrap();
        registry.register("mid-input").unwrap();

        let ids: Vec<&str> = registry.all_ids().map(SelectorId::as_str).collect();
        assert_eq!(ids, ["zeta-input", "alpha-input", "mid-input"]);
    }

    #[test]
    fn register_rejects_duplicate() {
        let mut registry = SelectorRegistry::new();
        registry.register("login-email-input").unwrap();

        let err = registry.register("login-email-input").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Duplicate);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_rejects_reserved_prefix() {
        let mut registry = SelectorRegistry::new();
        let err = registry.register("data-testid-login").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
        assert!(err.message.contains("reserved prefix"));
        assert!(registry.is_empty());
    }

    #[test]
    fn custom_reserved_prefixes() {
        let mut registry = SelectorRegistry::with_reserved_prefixes(["legacy-"]);
        assert!(registry.register("aria-label-input").is_ok());
        assert!(registry.register("legacy-form").is_err());
    }

    #[test]
    fn exists_and_get() {
        let mut registry = SelectorRegistry::new();
        registry.register("cart-checkout-button").unwrap();

        assert!(registry.exists("cart-checkout-button"));
        assert!(!registry.exists("cart-empty-state"));
        assert_eq!(
            registry.get("cart-checkout-button").map(SelectorId::as_str),
            Some("cart-checkout-button")
        );
    }

    #[test]
    fn selector_id_deserialize_validates() {
        let ok: SelectorId = serde_json::from_str("\"search-input\"").unwrap();
        assert_eq!(ok.as_str(), "search-input");

        let bad = serde_json::from_str::<SelectorId>("\"Search Input\"");
        assert!(bad.is_err());
    }
}
