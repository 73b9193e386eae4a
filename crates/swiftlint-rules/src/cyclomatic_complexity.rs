//! Rule to limit the cyclomatic complexity of functions.
//!
//! A function starts at 1 and each branch point adds one: `if`, `guard`,
//! `for`, `while`, `repeat`, `catch` and every `case` of a `switch`. Each
//! `fallthrough` takes one away. Nested functions are measured on their own.
//!
//! # Configuration
//!
//! - `warning` / `error`: complexity thresholds (default: 10 / 20)
//! - `ignores_case_statements`: count a whole `switch` as one branch
//!   instead of one per case (default: false)

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, validate_syntax_rule, ConfigError, Node,
    ReasonedRuleViolation, Rule, RuleDescription, RuleKind, Severity, SeverityLevelsConfiguration,
    SwiftLintFile, SyntaxRule, SyntaxTree, Violation,
};

use crate::support::{checked_levels, keyword_position};

/// Rule identifier for cyclomatic-complexity.
pub const IDENTIFIER: &str = "cyclomatic_complexity";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Cyclomatic Complexity",
    description: "Complexity of function bodies should be limited.",
    kind: RuleKind::Metrics,
    opt_in: false,
    requires_tree: true,
};

const FUNCTION_KINDS: &[&str] = &["function_declaration", "init_declaration"];

const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "guard_statement",
    "for_statement",
    "while_statement",
    "repeat_while_statement",
    "catch_block",
];

/// Options for [`CyclomaticComplexity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CyclomaticComplexityConfiguration {
    /// Complexity above this is a warning.
    pub warning: usize,
    /// Complexity above this is an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<usize>,
    /// Count a `switch` once instead of once per case.
    pub ignores_case_statements: bool,
}

impl Default for CyclomaticComplexityConfiguration {
    fn default() -> Self {
        Self {
            warning: 10,
            error: Some(20),
            ignores_case_statements: false,
        }
    }
}

/// Limits cyclomatic complexity of functions and initializers.
#[derive(Debug, Clone)]
pub struct CyclomaticComplexity {
    levels: SeverityLevelsConfiguration,
    ignores_case_statements: bool,
}

impl Default for CyclomaticComplexity {
    fn default() -> Self {
        Self::new()
    }
}

impl CyclomaticComplexity {
    /// Creates the rule with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        let defaults = CyclomaticComplexityConfiguration::default();
        Self {
            levels: SeverityLevelsConfiguration::new(defaults.warning, defaults.error),
            ignores_case_statements: defaults.ignores_case_statements,
        }
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn levels(mut self, warning: usize, error: Option<usize>) -> Self {
        self.levels = SeverityLevelsConfiguration::new(warning, error);
        self
    }

    /// Counts a `switch` once instead of once per case.
    #[must_use]
    pub fn ignores_case_statements(mut self, ignore: bool) -> Self {
        self.ignores_case_statements = ignore;
        self
    }

    fn complexity(&self, function: Node<'_>) -> usize {
        let mut complexity: i64 = 1;
        let mut stack: Vec<Node<'_>> = function.children().collect();
        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if FUNCTION_KINDS.contains(&kind) {
                continue;
            }
            if BRANCH_KINDS.contains(&kind)
                || (kind == "switch_entry" && !self.ignores_case_statements)
                || (kind == "switch_statement" && self.ignores_case_statements)
            {
                complexity += 1;
            } else if is_fallthrough(node) {
                complexity -= 1;
            }
            stack.extend(node.children());
        }
        usize::try_from(complexity).unwrap_or(0)
    }
}

fn is_fallthrough(node: Node<'_>) -> bool {
    match node.kind() {
        "fallthrough" => true,
        "simple_identifier" => node.text() == "fallthrough",
        _ => false,
    }
}

impl Rule for CyclomaticComplexity {
    fn description(&self) -> &'static RuleDescription {
        &DESCRIPTION
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn configuration_value(&self) -> toml::Value {
        rule_options_value(&CyclomaticComplexityConfiguration {
            warning: self.levels.warning,
            error: self.levels.error,
            ignores_case_statements: self.ignores_case_statements,
        })
    }

    fn apply_configuration(&mut self, value: &toml::Value) -> Result<(), ConfigError> {
        let options: CyclomaticComplexityConfiguration = parse_rule_options(IDENTIFIER, value)?;
        self.levels = checked_levels(IDENTIFIER, value, options.warning, options.error)?;
        self.ignores_case_statements = options.ignores_case_statements;
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        validate_syntax_rule(self, file)
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

impl SyntaxRule for CyclomaticComplexity {
    fn collect_violations(&self, _file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation> {
        tree.root()
            .descendants()
            .filter(|node| FUNCTION_KINDS.contains(&node.kind()))
            .filter_map(|function| {
                let complexity = self.complexity(function);
                let severity = self.levels.severity_for(complexity)?;
                let threshold = self.levels.threshold_for(severity);
                Some(
                    ReasonedRuleViolation::new(keyword_position(function))
                        .with_severity(severity)
                        .with_reason(format!(
                            "Function should have complexity {threshold} or less; currently complexity is {complexity}"
                        )),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{lines, violations};

    fn strict() -> CyclomaticComplexity {
        CyclomaticComplexity::new().levels(2, None)
    }

    #[test]
    fn test_simple_functions_pass() {
        let source = "func f(x: Int) {\n    if x > 0 {\n        print(x)\n    }\n}\n";
        assert!(violations(&strict(), source).is_empty());
    }

    #[test]
    fn test_branches_add_up() {
        let source = "\
func f(x: Int) {
    if x > 0 {
        print(x)
    }
    for i in 0..<x {
        print(i)
    }
    guard x < 10 else { return }
}
";
        let found = violations(&strict(), source);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].reason,
            "Function should have complexity 2 or less; currently complexity is 4"
        );
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn test_each_case_counts_unless_ignored() {
        let source = "\
func f(x: Int) {
    switch x {
    case 1: print(1)
    case 2: print(2)
    default: print(0)
    }
}
";
        let found = violations(&strict(), source);
        assert!(found[0].reason.ends_with("currently complexity is 4"), "{found:?}");
        assert!(violations(&strict().ignores_case_statements(true), source).is_empty());
    }

    #[test]
    fn test_fallthrough_reduces_complexity() {
        let source = "\
func f(x: Int) {
    switch x {
    case 1:
        print(1)
        fallthrough
    case 2: print(2)
    default: print(0)
    }
}
";
        let found = violations(&strict(), source);
        assert!(found[0].reason.ends_with("currently complexity is 3"), "{found:?}");
    }

    #[test]
    fn test_nested_functions_are_measured_separately() {
        let source = "\
func outer() {
    func inner(x: Int) {
        if x > 0 { print(1) }
        if x > 1 { print(2) }
    }
    inner(x: 1)
}
";
        assert_eq!(lines(&violations(&strict(), source)), vec![2]);
    }

    #[test]
    fn test_error_threshold() {
        let source = "\
func f(x: Int) {
    if x > 0 { print(0) }
    if x > 1 { print(1) }
    if x > 2 { print(2) }
}
";
        let found = violations(&CyclomaticComplexity::new().levels(1, Some(3)), source);
        assert_eq!(found[0].severity, Severity::Error);
        assert!(found[0].reason.starts_with("Function should have complexity 3 or less"));
    }
}
