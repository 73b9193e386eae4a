//! Rule against forced casts.
//!
//! # Rationale
//!
//! `x as! T` traps at runtime when the cast fails. A conditional cast with
//! `as?` makes the failure path explicit.
//!
//! # Detected Patterns
//!
//! - Every `as!` operator

use swiftlint_core::{
    parse_rule_options, rule_options_value, validate_syntax_rule, walk, ConfigError, Node,
    ReasonedRuleViolation, Rule, RuleDescription, RuleKind, Severity, SeverityConfiguration,
    SwiftLintFile, SyntaxRule, SyntaxTree, SyntaxVisitor, Violation, ViolationSink, VisitAction,
};

/// Rule identifier for force-cast.
pub const IDENTIFIER: &str = "force_cast";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Force Cast",
    description: "Force casts should be avoided",
    kind: RuleKind::Idiomatic,
    opt_in: false,
    requires_tree: true,
};

/// Flags `as!` casts.
#[derive(Debug, Clone)]
pub struct ForceCast {
    configuration: SeverityConfiguration,
}

impl Default for ForceCast {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceCast {
    /// Creates the rule with its default severity (error).
    #[must_use]
    pub fn new() -> Self {
        Self {
            configuration: SeverityConfiguration::new(Severity::Error),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.configuration.severity = severity;
        self
    }
}

impl Rule for ForceCast {
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
        validate_syntax_rule(self, file)
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

impl SyntaxRule for ForceCast {
    fn collect_violations(&self, _file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation> {
        let mut visitor = ForceCastVisitor::default();
        walk(tree.root(), &mut visitor);
        visitor.sink.into_violations()
    }
}

#[derive(Default)]
struct ForceCastVisitor {
    sink: ViolationSink,
}

impl SyntaxVisitor for ForceCastVisitor {
    fn visit(&mut self, node: Node<'_>) -> VisitAction {
        // String contents are named leaves, operators are not.
        let is_operator = node.kind() == "as_operator" || !node.is_named();
        if is_operator && node.text() == "as!" {
            self.sink.push(ReasonedRuleViolation::new(node.start()));
            return VisitAction::SkipChildren;
        }
        VisitAction::VisitChildren
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::violations;

    #[test]
    fn test_detects_force_cast() {
        let found = violations(&ForceCast::new(), "let x = y as! Int\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert_eq!(found[0].reason, "Force casts should be avoided");
        assert_eq!(found[0].location.line, 1);
        assert_eq!(found[0].location.character, Some(11));
    }

    #[test]
    fn test_allows_conditional_casts() {
        assert!(violations(&ForceCast::new(), "let x = y as? Int\nlet z = y as Any\n").is_empty());
    }

    #[test]
    fn test_ignores_string_contents() {
        assert!(violations(&ForceCast::new(), "let s = \"as!\"\n").is_empty());
    }

    #[test]
    fn test_builder_sets_severity() {
        let found = violations(&ForceCast::new().with_severity(Severity::Warning), "let x = y as! Int\n");
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn test_severity_is_configurable() {
        let mut rule = ForceCast::new();
        rule.apply_configuration(&toml::Value::String("warning".into()))
            .unwrap();
        let found = violations(&rule, "let x = y as! Int\n");
        assert_eq!(found[0].severity, Severity::Warning);
    }
}
