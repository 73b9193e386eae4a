//! The immutable set of rules a run can choose from.

use crate::config::ConfigError;
use crate::rule::{Rule, RuleDescription};
use std::collections::BTreeMap;

/// Creates a rule with its default configuration.
pub type RuleFactory = fn() -> Box<dyn Rule>;

/// Known rules keyed by identifier.
///
/// Built once at startup and passed to configuration resolution and the
/// linter as a plain value.
///
/// ```
/// use swiftlint_core::{RuleRegistry, SuperfluousDisableCommandRule};
///
/// let registry = RuleRegistry::builder()
///     .register(|| Box::new(SuperfluousDisableCommandRule::default()))
///     .build();
/// assert!(registry.contains("superfluous_disable_command"));
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: BTreeMap<&'static str, RuleFactory>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl RuleRegistry {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Every identifier, sorted.
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Returns true if `identifier` names a known rule.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Number of known rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Creates a rule with its default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRule`] for unknown identifiers.
    pub fn create(&self, identifier: &str) -> Result<Box<dyn Rule>, ConfigError> {
        self.factories
            .get(identifier)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::UnknownRule {
                identifier: identifier.to_string(),
            })
    }

    /// Creates a rule and applies `value` as its options.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown identifiers or rejected options.
    pub fn create_configured(
        &self,
        identifier: &str,
        value: &toml::Value,
    ) -> Result<Box<dyn Rule>, ConfigError> {
        let mut rule = self.create(identifier)?;
        rule.apply_configuration(value)?;
        Ok(rule)
    }

    /// One default-configured instance of every rule, sorted by identifier.
    #[must_use]
    pub fn rule_list(&self) -> Vec<Box<dyn Rule>> {
        self.factories.values().map(|factory| factory()).collect()
    }

    /// Static descriptions of every rule, sorted by identifier.
    #[must_use]
    pub fn descriptions(&self) -> Vec<&'static RuleDescription> {
        self.factories
            .values()
            .map(|factory| factory().description())
            .collect()
    }
}

/// Builder for [`RuleRegistry`].
#[derive(Default)]
pub struct RuleRegistryBuilder {
    factories: BTreeMap<&'static str, RuleFactory>,
}

impl RuleRegistryBuilder {
    /// Adds a rule.
    ///
    /// # Panics
    ///
    /// Panics if another rule already uses the same identifier.
    #[must_use]
    pub fn register(mut self, factory: RuleFactory) -> Self {
        let identifier = factory().identifier();
        let previous = self.factories.insert(identifier, factory);
        assert!(previous.is_none(), "rule '{identifier}' registered twice");
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            factories: self.factories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::SuperfluousDisableCommandRule;

    fn registry() -> RuleRegistry {
        RuleRegistry::builder()
            .register(|| Box::new(SuperfluousDisableCommandRule::default()))
            .build()
    }

    #[test]
    fn creates_known_rules() {
        let registry = registry();
        assert_eq!(registry.len(), 1);
        let rule = registry.create("superfluous_disable_command").unwrap();
        assert_eq!(rule.identifier(), "superfluous_disable_command");
        assert!(matches!(
            registry.create("nope"),
            Err(ConfigError::UnknownRule { identifier }) if identifier == "nope"
        ));
    }

    #[test]
    fn configured_rules_carry_their_options() {
        let registry = registry();
        let rule = registry
            .create_configured(
                "superfluous_disable_command",
                &toml::Value::String("error".into()),
            )
            .unwrap();
        assert_eq!(rule.severity(), crate::Severity::Error);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_identifiers_panic() {
        let _ = RuleRegistry::builder()
            .register(|| Box::new(SuperfluousDisableCommandRule::default()))
            .register(|| Box::new(SuperfluousDisableCommandRule::default()));
    }
}
