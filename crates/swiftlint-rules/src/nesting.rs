//! Rule to limit how deeply types and functions nest.
//!
//! # Rationale
//!
//! Deeply nested declarations are hard to read and usually hide a type that
//! wants to live on its own.
//!
//! # Configuration
//!
//! - `type_level`: thresholds for type nesting (default: warning 1)
//! - `function_level`: thresholds for function nesting (default: warning 2)
//! - `check_nesting_in_closures_and_statements`: also count declarations
//!   inside closures and statement bodies (default: true)
//! - `always_allow_one_type_in_functions`: a type directly inside a
//!   function is never reported (default: false)
//! - `ignore_typealiases_and_associatedtypes`: skip `typealias` and
//!   `associatedtype` (default: false)

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, validate_syntax_rule, walk, ConfigError, Node,
    ReasonedRuleViolation, Rule, RuleDescription, RuleKind, Severity, SeverityLevelsConfiguration,
    SwiftLintFile, SyntaxRule, SyntaxTree, SyntaxVisitor, Violation, ViolationSink, VisitAction,
};

use crate::support::keyword_position;

/// Rule identifier for nesting.
pub const IDENTIFIER: &str = "nesting";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Nesting",
    description: "Types should be nested at most 1 level deep, and functions should be nested at most 2 levels deep.",
    kind: RuleKind::Metrics,
    opt_in: false,
    requires_tree: true,
};

const TYPE_KINDS: &[&str] = &["class_declaration", "protocol_declaration"];
const FUNCTION_KINDS: &[&str] = &["function_declaration", "protocol_function_declaration"];
const ALIAS_KINDS: &[&str] = &["typealias_declaration", "associatedtype_declaration"];

/// Closures and statement bodies, skipped when they are not checked.
const CLOSURES_AND_STATEMENTS: &[&str] = &[
    "lambda_literal",
    "if_statement",
    "guard_statement",
    "for_statement",
    "while_statement",
    "repeat_while_statement",
    "do_statement",
    "switch_statement",
];

/// Options for [`Nesting`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NestingConfiguration {
    /// Thresholds for type nesting.
    pub type_level: SeverityLevelsConfiguration,
    /// Thresholds for function nesting.
    pub function_level: SeverityLevelsConfiguration,
    /// Whether declarations inside closures and statements count.
    pub check_nesting_in_closures_and_statements: bool,
    /// Whether one type directly inside a function is always allowed.
    pub always_allow_one_type_in_functions: bool,
    /// Whether `typealias` and `associatedtype` are skipped.
    pub ignore_typealiases_and_associatedtypes: bool,
}

impl Default for NestingConfiguration {
    fn default() -> Self {
        Self {
            type_level: SeverityLevelsConfiguration::new(1, None),
            function_level: SeverityLevelsConfiguration::new(2, None),
            check_nesting_in_closures_and_statements: true,
            always_allow_one_type_in_functions: false,
            ignore_typealiases_and_associatedtypes: false,
        }
    }
}

/// Limits nesting depth of types and functions.
#[derive(Debug, Clone, Default)]
pub struct Nesting {
    configuration: NestingConfiguration,
}

impl Nesting {
    /// Creates the rule with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type nesting warning threshold.
    #[must_use]
    pub fn type_level(mut self, warning: usize) -> Self {
        self.configuration.type_level = SeverityLevelsConfiguration::new(warning, None);
        self
    }

    /// Sets the function nesting warning threshold.
    #[must_use]
    pub fn function_level(mut self, warning: usize) -> Self {
        self.configuration.function_level = SeverityLevelsConfiguration::new(warning, None);
        self
    }

    /// Allows one type directly inside a function.
    #[must_use]
    pub fn always_allow_one_type_in_functions(mut self, allow: bool) -> Self {
        self.configuration.always_allow_one_type_in_functions = allow;
        self
    }

    /// Sets whether closures and statement bodies are checked.
    #[must_use]
    pub fn check_nesting_in_closures_and_statements(mut self, check: bool) -> Self {
        self.configuration.check_nesting_in_closures_and_statements = check;
        self
    }
}

impl Rule for Nesting {
    fn description(&self) -> &'static RuleDescription {
        &DESCRIPTION
    }

    fn severity(&self) -> Severity {
        Severity::Warning
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

impl SyntaxRule for Nesting {
    fn collect_violations(&self, _file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation> {
        let mut visitor = NestingVisitor {
            configuration: &self.configuration,
            levels: Levels::default(),
            sink: ViolationSink::new(),
        };
        walk(tree.root(), &mut visitor);
        visitor.sink.into_violations()
    }
}

/// Type and function depth, counted separately. Both start at -1 so a
/// top-level declaration sits at level 0.
struct Levels {
    type_level: i64,
    function_level: i64,
    is_function: Vec<bool>,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            type_level: -1,
            function_level: -1,
            is_function: Vec::new(),
        }
    }
}

impl Levels {
    fn last_is_function(&self) -> bool {
        self.is_function.last() == Some(&true)
    }

    fn validate(&mut self, for_function: bool, configuration: &NestingConfiguration) -> Option<(Severity, String)> {
        let in_function = self.last_is_function();
        self.push(for_function);

        if configuration.always_allow_one_type_in_functions && in_function && !for_function {
            return None;
        }
        let (level, levels, target) = if for_function {
            (self.function_level, &configuration.function_level, "Functions")
        } else {
            (self.type_level, &configuration.type_level, "Types")
        };
        let severity = levels.severity_for(usize::try_from(level).unwrap_or(0))?;
        let threshold = levels.threshold_for(severity);
        let plural = if threshold > 1 { "s" } else { "" };
        Some((severity, format!("{target} should be nested at most {threshold} level{plural} deep")))
    }

    fn push(&mut self, is_function: bool) {
        self.is_function.push(is_function);
        self.update(1);
    }

    fn pop(&mut self) {
        self.update(-1);
        self.is_function.pop();
    }

    fn update(&mut self, delta: i64) {
        if self.last_is_function() {
            self.function_level += delta;
        } else {
            self.type_level += delta;
        }
    }
}

struct NestingVisitor<'a> {
    configuration: &'a NestingConfiguration,
    levels: Levels,
    sink: ViolationSink,
}

impl NestingVisitor<'_> {
    fn check(&mut self, node: Node<'_>, for_function: bool) {
        if let Some((severity, reason)) = self.levels.validate(for_function, self.configuration) {
            self.sink.push(
                ReasonedRuleViolation::new(keyword_position(node))
                    .with_severity(severity)
                    .with_reason(reason),
            );
        }
    }
}

impl SyntaxVisitor for NestingVisitor<'_> {
    fn visit(&mut self, node: Node<'_>) -> VisitAction {
        let kind = node.kind();
        if TYPE_KINDS.contains(&kind) {
            self.check(node, false);
        } else if FUNCTION_KINDS.contains(&kind) {
            self.check(node, true);
        } else if ALIAS_KINDS.contains(&kind) {
            return VisitAction::SkipChildren;
        }
        VisitAction::VisitChildren
    }

    fn visit_post(&mut self, node: Node<'_>) {
        let kind = node.kind();
        if TYPE_KINDS.contains(&kind) || FUNCTION_KINDS.contains(&kind) {
            self.levels.pop();
        } else if ALIAS_KINDS.contains(&kind) && !self.configuration.ignore_typealiases_and_associatedtypes {
            self.check(node, false);
            self.levels.pop();
        }
    }

    fn skippable_kinds(&self) -> &[&'static str] {
        if self.configuration.check_nesting_in_closures_and_statements {
            &[]
        } else {
            CLOSURES_AND_STATEMENTS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{lines, violations};

    #[test]
    fn test_reports_only_the_innermost_type() {
        let source = "\
class A {
    class B {
        class C {}
    }
}
";
        let found = violations(&Nesting::new(), source);
        assert_eq!(lines(&found), vec![3]);
        assert_eq!(found[0].reason, "Types should be nested at most 1 level deep");
        assert_eq!(found[0].severity, Severity::Warning);
        assert_eq!(found[0].location.character, Some(9));
    }

    #[test]
    fn test_struct_enum_and_extension_count_as_types() {
        let source = "\
extension A {
    struct B {
        enum C {}
    }
}
";
        assert_eq!(lines(&violations(&Nesting::new(), source)), vec![3]);
    }

    #[test]
    fn test_functions_nest_deeper_than_types() {
        let source = "\
func a() {
    func b() {
        func c() {
            func d() {}
        }
    }
}
";
        let found = violations(&Nesting::new(), source);
        assert_eq!(lines(&found), vec![4]);
        assert_eq!(found[0].reason, "Functions should be nested at most 2 levels deep");
    }

    #[test]
    fn test_methods_start_a_fresh_function_count() {
        let source = "\
struct A {
    func b() {
        func c() {
            func d() {}
        }
    }
}
";
        assert!(violations(&Nesting::new(), source).is_empty());
    }

    #[test]
    fn test_one_type_in_a_function_can_be_allowed() {
        let source = "\
class A {
    func b() {
        struct C {}
    }
}
";
        assert_eq!(lines(&violations(&Nesting::new().type_level(0), source)), vec![3]);
        let allowed = Nesting::new().type_level(0).always_allow_one_type_in_functions(true);
        assert!(violations(&allowed, source).is_empty());
    }

    #[test]
    fn test_closures_can_be_skipped() {
        let source = "\
class A {
    class B {
        let c = {
            class D {}
        }
    }
}
";
        assert_eq!(lines(&violations(&Nesting::new(), source)), vec![4]);
        let lenient = Nesting::new().check_nesting_in_closures_and_statements(false);
        assert!(violations(&lenient, source).is_empty());
    }

    #[test]
    fn test_error_threshold_from_configuration() {
        let mut rule = Nesting::new();
        let value: toml::Value = toml::from_str("type_level = { warning = 1, error = 2 }").unwrap();
        rule.apply_configuration(&value).unwrap();
        let source = "\
class A {
    class B {
        class C {
            class D {}
        }
    }
}
";
        let found = violations(&rule, source);
        assert_eq!(lines(&found), vec![3, 4]);
        assert_eq!(found[0].severity, Severity::Warning);
        assert_eq!(found[1].severity, Severity::Error);
        assert_eq!(found[1].reason, "Types should be nested at most 2 levels deep");
    }

    #[test]
    fn test_rejects_unknown_options() {
        let value: toml::Value = toml::from_str("type_depth = 3").unwrap();
        assert!(Nesting::new().apply_configuration(&value).is_err());
    }
}
