//! Rule against `swiftlint:disable` commands that are never re-enabled.
//!
//! Walks a file's commands in order, tracking which rules are disabled.
//! Disabling a rule twice, enabling a rule that was never disabled, and
//! leaving a rule disabled at the end of the file are all reported.
//! Commands with a `previous`, `this` or `next` modifier are checked but do
//! not change the tracked state.
//!
//! # Configuration
//!
//! - `severity` (default: warning)
//! - `allowed_rules`: rules that may stay disabled to the end of the file
//! - `always_blanket_disable`: rules that only make sense disabled for the
//!   whole file; enabling them or disabling them locally is reported

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, Action, Command, ConfigError, Rule, RuleDescription,
    RuleIdentifier, RuleKind, Severity, SwiftLintFile, Violation,
};

/// Rule identifier for blanket-disable-command.
pub const IDENTIFIER: &str = "blanket_disable_command";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Blanket Disable Command",
    description: "swiftlint:disable commands should be re-enabled before the end of the file",
    kind: RuleKind::Lint,
    opt_in: false,
    requires_tree: false,
};

/// Options for [`BlanketDisableCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlanketDisableCommandConfiguration {
    /// Severity of violations.
    pub severity: Severity,
    /// Rules that may stay disabled until the end of the file.
    pub allowed_rules: BTreeSet<String>,
    /// Rules that should only ever be disabled for the whole file.
    pub always_blanket_disable: BTreeSet<String>,
}

impl Default for BlanketDisableCommandConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            allowed_rules: [
                "file_header",
                "file_length",
                "file_name",
                "file_name_no_space",
                "single_test_class",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            always_blanket_disable: BTreeSet::new(),
        }
    }
}

/// Flags disable commands without a matching enable.
#[derive(Debug, Clone, Default)]
pub struct BlanketDisableCommand {
    configuration: BlanketDisableCommandConfiguration,
}

impl BlanketDisableCommand {
    /// Creates the rule with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_always_blanket(&self, rule: &RuleIdentifier) -> bool {
        self.configuration.always_blanket_disable.contains(rule.as_str())
    }

    fn violation(&self, file: &SwiftLintFile, command: &Command, reason: String) -> Violation {
        DESCRIPTION.violation_on_line(file, self.configuration.severity, command.line, command.character, reason)
    }
}

impl Rule for BlanketDisableCommand {
    fn description(&self) -> &'static RuleDescription {
        &DESCRIPTION
    }

    fn severity(&self) -> Severity {
        self.configuration.severity
    }

    fn configuration_value(&self) -> toml::Value {
        rule_options_value(&self.configuration)
    }

    fn apply_configuration(&mut self, value: &toml::Value) -> Result<(), ConfigError> {
        self.configuration = parse_rule_options(IDENTIFIER, value)?;
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut disabled: BTreeMap<RuleIdentifier, &Command> = BTreeMap::new();

        for command in file.commands() {
            match command.action {
                Action::Disable => {
                    for rule in command.rule_identifiers.iter().filter(|r| disabled.contains_key(*r)) {
                        violations.push(self.violation(
                            file,
                            command,
                            format!("The disabled '{rule}' rule was already disabled"),
                        ));
                    }
                }
                Action::Enable => {
                    for rule in command.rule_identifiers.iter().filter(|r| !disabled.contains_key(*r)) {
                        violations.push(self.violation(
                            file,
                            command,
                            format!("The enabled '{rule}' rule was not disabled"),
                        ));
                    }
                }
                Action::Invalid => continue,
            }

            if command.modifier.is_some() {
                for rule in command.rule_identifiers.iter().filter(|r| self.is_always_blanket(r)) {
                    violations.push(self.violation(
                        file,
                        command,
                        format!(
                            "The '{rule}' rule applies to the whole file and thus cannot be disabled \
                             locally with 'previous', 'this' or 'next'"
                        ),
                    ));
                }
                continue;
            }

            if command.action == Action::Disable {
                for rule in &command.rule_identifiers {
                    disabled.insert(rule.clone(), command);
                }
            } else {
                for rule in &command.rule_identifiers {
                    disabled.remove(rule);
                    if self.is_always_blanket(rule) {
                        violations.push(self.violation(
                            file,
                            command,
                            format!("The '{rule}' rule applies to the whole file and thus doesn't need to be re-enabled"),
                        ));
                    }
                }
            }
        }

        for (rule, command) in disabled {
            if self.configuration.allowed_rules.contains(rule.as_str()) || self.is_always_blanket(&rule) {
                continue;
            }
            violations.push(self.violation(
                file,
                command,
                format!("The disabled '{rule}' rule should be re-enabled before the end of the file"),
            ));
        }
        violations
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{lines, violations};

    fn reasons(found: &[Violation]) -> Vec<&str> {
        found.iter().map(|v| v.reason.as_str()).collect()
    }

    #[test]
    fn test_balanced_commands_pass() {
        let source = "\
// swiftlint:disable force_cast
let a = b as! Int
// swiftlint:enable force_cast
let c = d // swiftlint:disable:this line_length
";
        assert!(violations(&BlanketDisableCommand::new(), source).is_empty());
    }

    #[test]
    fn test_unclosed_disable_is_reported_at_the_command() {
        let found = violations(&BlanketDisableCommand::new(), "let a = 1\n// swiftlint:disable force_cast\nlet b = c as! Int\n");
        assert_eq!(lines(&found), vec![2]);
        assert_eq!(
            found[0].reason,
            "The disabled 'force_cast' rule should be re-enabled before the end of the file"
        );
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn test_allowed_rules_may_stay_disabled() {
        let source = "// swiftlint:disable file_length\nlet a = 1\n";
        assert!(violations(&BlanketDisableCommand::new(), source).is_empty());
    }

    #[test]
    fn test_double_disable_and_stray_enable() {
        let source = "\
// swiftlint:disable force_cast
// swiftlint:disable force_cast
// swiftlint:enable force_cast
// swiftlint:enable nesting
";
        let found = violations(&BlanketDisableCommand::new(), source);
        assert_eq!(lines(&found), vec![2, 4]);
        assert_eq!(
            reasons(&found),
            vec![
                "The disabled 'force_cast' rule was already disabled",
                "The enabled 'nesting' rule was not disabled",
            ]
        );
    }

    #[test]
    fn test_modifiers_do_not_change_state() {
        let source = "\
// swiftlint:disable:next force_cast
let a = b as! Int
// swiftlint:enable force_cast
";
        let found = violations(&BlanketDisableCommand::new(), source);
        assert_eq!(reasons(&found), vec!["The enabled 'force_cast' rule was not disabled"]);
    }

    #[test]
    fn test_always_blanket_disable_rules() {
        let mut rule = BlanketDisableCommand::new();
        let value: toml::Value = toml::from_str("always_blanket_disable = [\"nesting\"]").unwrap();
        rule.apply_configuration(&value).unwrap();
        let source = "\
// swiftlint:disable nesting
// swiftlint:enable nesting
// swiftlint:disable:next nesting
class A {}
";
        let found = violations(&rule, source);
        assert_eq!(lines(&found), vec![2, 3]);
        assert_eq!(
            found[0].reason,
            "The 'nesting' rule applies to the whole file and thus doesn't need to be re-enabled"
        );
        assert!(found[1].reason.contains("cannot be disabled locally"));

        let whole_file = "// swiftlint:disable nesting\nclass A {}\n";
        assert!(violations(&rule, whole_file).is_empty());
    }
}
