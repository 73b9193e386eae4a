//! Rule preferring `allSatisfy` and `contains` over boolean `reduce`.
//!
//! # Detected Patterns
//!
//! - `xs.reduce(true) { ... }` and `xs.reduce(true, { ... })`
//! - `xs.reduce(false) { ... }` and `xs.reduce(false, { ... })`
//!
//! # Correction
//!
//! Closures of the form `{ $0 && expr }` (for `true`) or `{ $0 || expr }`
//! (for `false`), where `expr` does not use `$0`, are rewritten to
//! `xs.allSatisfy { expr }` and `xs.contains { expr }` with `$1` renamed to
//! `$0`. Other closures are reported but left alone.

use std::sync::LazyLock;

use regex::Regex;
use swiftlint_core::{
    parse_rule_options, rule_options_value, validate_syntax_rule, walk, ConfigError,
    CorrectableRule, CorrectionStrategy, Node, Position, ReasonedRuleViolation, Rule, RuleDescription,
    RuleKind, Severity, SeverityConfiguration, SwiftLintFile, SyntaxRewriteRule, SyntaxRule,
    SyntaxTree, SyntaxVisitor, Violation, ViolationSink, VisitAction,
};

/// Rule identifier for reduce-boolean.
pub const IDENTIFIER: &str = "reduce_boolean";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Reduce Boolean",
    description: "Prefer using `.allSatisfy()` or `.contains()` over `reduce(true)` or `reduce(false)`.",
    kind: RuleKind::Performance,
    opt_in: false,
    requires_tree: true,
};

const REDUCE_SUFFIX: &str = ".reduce";

#[allow(clippy::expect_used)]
static INITIAL_RESULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*(true|false)\s*[,)]").expect("literal pattern"));

#[allow(clippy::expect_used)]
static CLOSURE_ARGUMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*\(\s*(true|false)\s*(?:\)\s*\{(.*)\}|,\s*\{(.*)\}\s*\))\s*$").expect("literal pattern")
});

#[allow(clippy::expect_used)]
static SHORTHAND_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*\$0\s*(&&|\|\|)\s*(.+?)\s*$").expect("literal pattern"));

/// Flags `reduce(true)` and `reduce(false)`.
#[derive(Debug, Clone)]
pub struct ReduceBoolean {
    configuration: SeverityConfiguration,
}

impl Default for ReduceBoolean {
    fn default() -> Self {
        Self::new()
    }
}

impl ReduceBoolean {
    /// Creates the rule with its default severity (warning).
    #[must_use]
    pub fn new() -> Self {
        Self {
            configuration: SeverityConfiguration::new(Severity::Warning),
        }
    }
}

/// A `.reduce` call split around its callee.
struct ReduceCall<'a> {
    /// The callee ending in `.reduce`.
    callee: Node<'a>,
    /// Everything after the callee: arguments and trailing closure.
    arguments: &'a str,
}

impl<'a> ReduceCall<'a> {
    fn of(node: Node<'a>) -> Option<Self> {
        if node.kind() != "call_expression" {
            return None;
        }
        let mut callee = node.named_children().next()?;
        while callee.kind() == "call_expression" {
            callee = callee.named_children().next()?;
        }
        if !callee.text().ends_with(REDUCE_SUFFIX) {
            return None;
        }
        let arguments = node.text().get(callee.end().offset() - node.start().offset()..)?;
        Some(Self { callee, arguments })
    }

    fn receiver(&self) -> &'a str {
        let text = self.callee.text();
        &text[..text.len() - REDUCE_SUFFIX.len()]
    }
}

fn preferred_method(initial: &str) -> &'static str {
    if initial == "true" {
        "allSatisfy"
    } else {
        "contains"
    }
}

impl Rule for ReduceBoolean {
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

    fn as_correctable(&self) -> Option<&dyn CorrectableRule> {
        Some(self)
    }
}

impl SyntaxRule for ReduceBoolean {
    fn collect_violations(&self, _file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation> {
        let mut visitor = ReduceBooleanVisitor::default();
        walk(tree.root(), &mut visitor);
        visitor.sink.into_violations()
    }
}

#[derive(Default)]
struct ReduceBooleanVisitor {
    sink: ViolationSink,
}

impl SyntaxVisitor for ReduceBooleanVisitor {
    fn visit(&mut self, node: Node<'_>) -> VisitAction {
        // A trailing closure may wrap the call in a second call_expression;
        // only the innermost one is reported.
        let wraps_call = node
            .named_children()
            .next()
            .is_some_and(|callee| callee.kind() == "call_expression");
        if wraps_call {
            return VisitAction::VisitChildren;
        }
        if let Some(call) = ReduceCall::of(node) {
            if let Some(captures) = INITIAL_RESULT.captures(call.arguments) {
                let method = preferred_method(&captures[1]);
                let position = call.callee.end().offset() - "reduce".len();
                self.sink.push(
                    ReasonedRuleViolation::new(Position(position))
                        .with_reason(format!("Use `{method}` instead")),
                );
            }
        }
        VisitAction::VisitChildren
    }
}

impl CorrectableRule for ReduceBoolean {
    fn correction_strategy(&self) -> CorrectionStrategy<'_> {
        CorrectionStrategy::Rewrite(self)
    }
}

impl SyntaxRewriteRule for ReduceBoolean {
    fn rewrite(&self, node: Node<'_>, _file: &SwiftLintFile) -> Option<String> {
        let call = ReduceCall::of(node)?;
        let captures = CLOSURE_ARGUMENTS.captures(call.arguments)?;
        let initial = &captures[1];
        let body = captures.get(2).or_else(|| captures.get(3))?.as_str();

        let shorthand = SHORTHAND_BODY.captures(body)?;
        let expected = if initial == "true" { "&&" } else { "||" };
        let rest = &shorthand[2];
        if &shorthand[1] != expected || rest.contains("$0") {
            return None;
        }
        Some(format!(
            "{}.{} {{ {} }}",
            call.receiver(),
            preferred_method(initial),
            rest.replace("$1", "$0")
        ))
    }
}
