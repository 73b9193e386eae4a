//! Rule against spaces and tabs at the end of a line.
//!
//! # Configuration
//!
//! - `ignores_empty_lines`: lines holding only whitespace are fine (default: false)
//! - `ignores_comments`: lines ending in a `//` comment or sitting inside a
//!   block comment are fine (default: true)

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, ByteRange, ConfigError, CorrectableRule,
    CorrectionStrategy, Rule, RuleDescription, RuleKind, Severity, SubstitutionCorrectableRule,
    SwiftLintFile, Violation,
};

use crate::support::CommentCoverage;

/// Rule identifier for trailing-whitespace.
pub const IDENTIFIER: &str = "trailing_whitespace";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Trailing Whitespace",
    description: "Lines should not have trailing whitespace",
    kind: RuleKind::Style,
    opt_in: false,
    requires_tree: false,
};

/// Options for [`TrailingWhitespace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrailingWhitespaceConfiguration {
    /// Severity of violations.
    pub severity: Severity,
    /// Skip lines holding only whitespace.
    pub ignores_empty_lines: bool,
    /// Skip comment lines.
    pub ignores_comments: bool,
}

impl Default for TrailingWhitespaceConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            ignores_empty_lines: false,
            ignores_comments: true,
        }
    }
}

/// Flags and strips trailing whitespace.
#[derive(Debug, Clone, Default)]
pub struct TrailingWhitespace {
    configuration: TrailingWhitespaceConfiguration,
}

impl TrailingWhitespace {
    /// Creates the rule with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether whitespace-only lines are skipped.
    #[must_use]
    pub fn ignores_empty_lines(mut self, ignore: bool) -> Self {
        self.configuration.ignores_empty_lines = ignore;
        self
    }

    /// Sets whether comment lines are skipped.
    #[must_use]
    pub fn ignores_comments(mut self, ignore: bool) -> Self {
        self.configuration.ignores_comments = ignore;
        self
    }

    /// Line number and whitespace span of every offending line.
    fn trailing_whitespace(&self, file: &SwiftLintFile) -> Vec<(usize, ByteRange)> {
        let coverage = self
            .configuration
            .ignores_comments
            .then(|| CommentCoverage::new(file));
        file.lines()
            .filter_map(|line| {
                let kept = line.content.trim_end_matches([' ', '\t']);
                if kept.len() == line.content.len() {
                    return None;
                }
                if self.configuration.ignores_empty_lines && kept.is_empty() {
                    return None;
                }
                if let Some(coverage) = &coverage {
                    if coverage.ends_in_line_comment(&line) || coverage.inside_block_comment(&line) {
                        return None;
                    }
                }
                let content_end = line.range.start + line.content.len();
                Some((line.index, ByteRange::new(line.range.start + kept.len(), content_end)))
            })
            .collect()
    }
}

impl Rule for TrailingWhitespace {
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
        self.trailing_whitespace(file)
            .into_iter()
            .map(|(line, _)| {
                DESCRIPTION.violation_on_line(file, self.severity(), line, None, DESCRIPTION.description)
            })
            .collect()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }

    fn as_correctable(&self) -> Option<&dyn CorrectableRule> {
        Some(self)
    }
}

impl CorrectableRule for TrailingWhitespace {
    fn correction_strategy(&self) -> CorrectionStrategy<'_> {
        CorrectionStrategy::Substitution(self)
    }
}

impl SubstitutionCorrectableRule for TrailingWhitespace {
    fn violation_ranges(&self, file: &SwiftLintFile) -> Vec<ByteRange> {
        self.trailing_whitespace(file)
            .into_iter()
            .map(|(_, range)| range)
            .collect()
    }

    fn substitution(&self, range: ByteRange, _file: &SwiftLintFile) -> Option<(ByteRange, String)> {
        Some((range, String::new()))
    }
}
