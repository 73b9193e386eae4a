//! The built-in rule catalogue.

use swiftlint_core::{RuleRegistry, SuperfluousDisableCommandRule};

use crate::{
    BlanketDisableCommand, CyclomaticComplexity, ForceCast, FunctionBodyLength, LineLength,
    Nesting, ReduceBoolean, TrailingWhitespace, UnusedDeclaration, UnusedImport,
};

/// Registry of every built-in rule, including `superfluous_disable_command`.
///
/// Each factory yields the rule with its default options.
#[must_use]
pub fn registry() -> RuleRegistry {
    RuleRegistry::builder()
        .register(|| Box::new(BlanketDisableCommand::new()))
        .register(|| Box::new(CyclomaticComplexity::new()))
        .register(|| Box::new(ForceCast::new()))
        .register(|| Box::new(FunctionBodyLength::new()))
        .register(|| Box::new(LineLength::new()))
        .register(|| Box::new(Nesting::new()))
        .register(|| Box::new(ReduceBoolean::new()))
        .register(|| Box::new(TrailingWhitespace::new()))
        .register(|| Box::new(UnusedDeclaration::new()))
        .register(|| Box::new(UnusedImport::new()))
        .register(|| Box::new(SuperfluousDisableCommandRule::default()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlint_core::Config;

    #[test]
    fn test_registry_lists_every_rule() {
        let registry = registry();
        assert_eq!(registry.len(), 11);
        assert!(registry.contains("superfluous_disable_command"));
        assert!(registry.contains("reduce_boolean"));
    }

    #[test]
    fn test_default_configuration_leaves_out_opt_in_rules() {
        let rules = Config::new().enabled_rules(&registry()).unwrap();
        let ids: Vec<_> = rules.iter().map(|rule| rule.identifier()).collect();
        assert!(ids.contains(&"force_cast"));
        assert!(ids.contains(&"line_length"));
        assert!(!ids.contains(&"unused_declaration"));
        assert!(!ids.contains(&"unused_import"));
    }

    #[test]
    fn test_configuration_values_apply_back() {
        for mut rule in registry().rule_list() {
            let value = rule.configuration_value();
            rule.apply_configuration(&value)
                .unwrap_or_else(|e| panic!("{}: {e}", rule.identifier()));
            assert_eq!(rule.configuration_value(), value, "{}", rule.identifier());
        }
    }
}
