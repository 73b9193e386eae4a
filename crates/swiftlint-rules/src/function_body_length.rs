//! Rule to limit the length of function bodies.
//!
//! Counts the lines between the opening and closing brace, leaving out
//! blank lines and lines holding only comments.
//!
//! # Configuration
//!
//! - `warning`: maximum lines before a warning (default: 50)
//! - `error`: maximum lines before an error (default: 100)

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, validate_syntax_rule, ConfigError, Node,
    ReasonedRuleViolation, Rule, RuleDescription, RuleKind, Severity, SeverityLevelsConfiguration,
    SwiftLintFile, SyntaxRule, SyntaxTree, Violation,
};

use crate::support::{checked_levels, keyword_position, CommentCoverage};

/// Rule identifier for function-body-length.
pub const IDENTIFIER: &str = "function_body_length";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Function Body Length",
    description: "Function bodies should not span too many lines",
    kind: RuleKind::Metrics,
    opt_in: false,
    requires_tree: true,
};

const FUNCTION_KINDS: &[&str] = &["function_declaration", "init_declaration", "deinit_declaration"];

/// Options for [`FunctionBodyLength`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunctionBodyLengthConfiguration {
    /// Lines above this are warnings.
    pub warning: usize,
    /// Lines above this are errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<usize>,
}

impl Default for FunctionBodyLengthConfiguration {
    fn default() -> Self {
        Self {
            warning: 50,
            error: Some(100),
        }
    }
}

/// Limits function body length.
#[derive(Debug, Clone)]
pub struct FunctionBodyLength {
    levels: SeverityLevelsConfiguration,
}

impl Default for FunctionBodyLength {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionBodyLength {
    /// Creates the rule with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        let defaults = FunctionBodyLengthConfiguration::default();
        Self {
            levels: SeverityLevelsConfiguration::new(defaults.warning, defaults.error),
        }
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn levels(mut self, warning: usize, error: Option<usize>) -> Self {
        self.levels = SeverityLevelsConfiguration::new(warning, error);
        self
    }
}

impl Rule for FunctionBodyLength {
    fn description(&self) -> &'static RuleDescription {
        &DESCRIPTION
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn configuration_value(&self) -> toml::Value {
        rule_options_value(&FunctionBodyLengthConfiguration {
            warning: self.levels.warning,
            error: self.levels.error,
        })
    }

    fn apply_configuration(&mut self, value: &toml::Value) -> Result<(), ConfigError> {
        let options: FunctionBodyLengthConfiguration = parse_rule_options(IDENTIFIER, value)?;
        self.levels = checked_levels(IDENTIFIER, value, options.warning, options.error)?;
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        validate_syntax_rule(self, file)
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

impl SyntaxRule for FunctionBodyLength {
    fn collect_violations(&self, file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation> {
        let coverage = CommentCoverage::new(file);
        tree.root()
            .descendants()
            .filter(|node| FUNCTION_KINDS.contains(&node.kind()))
            .filter_map(|function| {
                let body = function.child_by_kind("function_body")?;
                let count = body_line_count(file, &coverage, body);
                let severity = self.levels.severity_for(count)?;
                let threshold = self.levels.threshold_for(severity);
                Some(
                    ReasonedRuleViolation::new(keyword_position(function))
                        .with_severity(severity)
                        .with_reason(format!(
                            "Function body should span {threshold} lines or less excluding comments and \
                             whitespace: currently spans {count} lines"
                        )),
                )
            })
            .collect()
    }
}

/// Lines strictly between the brace lines that hold code.
fn body_line_count(file: &SwiftLintFile, coverage: &CommentCoverage, body: Node<'_>) -> usize {
    let converter = file.converter();
    let (open_line, _) = converter.location(body.start());
    let (close_line, _) = converter.location(body.end());
    if open_line == close_line {
        let inner = body.text().trim_start_matches('{').trim_end_matches('}');
        return usize::from(!inner.trim().is_empty());
    }
    file.lines()
        .filter(|line| open_line < line.index && line.index < close_line)
        .filter(|line| !line.content.trim().is_empty() && !coverage.is_comment_only(line))
        .count()
}
