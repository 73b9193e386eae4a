//! Rule to limit line length.
//!
//! Length is measured in characters after optional stripping: URLs when
//! `ignores_urls` is set, and color or image literals always collapse to `#`.
//!
//! # Configuration
//!
//! - `warning` / `error`: maximum characters (default: 120 / 200)
//! - `ignores_urls`: drop URLs before measuring (default: false)
//! - `ignores_function_declarations`: skip function signature lines (default: false)
//! - `ignores_comments`: skip comment-only lines (default: false)
//! - `ignores_interpolated_strings`: skip lines with string interpolation (default: false)
//! - `excluded_lines_patterns`: regexes; matching lines are skipped

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, ConfigError, Rule, RuleDescription, RuleKind,
    Severity, SeverityLevelsConfiguration, SwiftLintFile, Violation,
};

use tracing::debug;

use crate::support::{checked_levels, CommentCoverage};

/// Rule identifier for line-length.
pub const IDENTIFIER: &str = "line_length";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Line Length",
    description: "Lines should not span too many characters.",
    kind: RuleKind::Metrics,
    opt_in: false,
    requires_tree: false,
};

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "init_declaration",
    "protocol_function_declaration",
];

#[allow(clippy::expect_used)]
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:[a-z][\w-]+:(?:/{1,3}|[a-z0-9%])|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\((?:[^\s()<>]+|\([^\s()<>]+\))*\))+(?:\((?:[^\s()<>]+|\([^\s()<>]+\))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’])"#,
    )
    .expect("literal pattern")
});

#[allow(clippy::expect_used)]
static OBJECT_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:colorLiteral|imageLiteral)\([^)]*\)").expect("literal pattern")
});

/// Options for [`LineLength`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineLengthConfiguration {
    /// Characters above this are warnings.
    pub warning: usize,
    /// Characters above this are errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<usize>,
    /// Drop URLs before measuring.
    pub ignores_urls: bool,
    /// Skip lines that belong to a function signature.
    pub ignores_function_declarations: bool,
    /// Skip lines holding only comments.
    pub ignores_comments: bool,
    /// Skip lines with string interpolation.
    pub ignores_interpolated_strings: bool,
    /// Lines matching any of these regexes are skipped.
    pub excluded_lines_patterns: Vec<String>,
}

impl Default for LineLengthConfiguration {
    fn default() -> Self {
        Self {
            warning: 120,
            error: Some(200),
            ignores_urls: false,
            ignores_function_declarations: false,
            ignores_comments: false,
            ignores_interpolated_strings: false,
            excluded_lines_patterns: Vec::new(),
        }
    }
}

/// Limits line length.
#[derive(Debug, Clone)]
pub struct LineLength {
    configuration: LineLengthConfiguration,
    levels: SeverityLevelsConfiguration,
    excluded_lines: Vec<Regex>,
}

impl Default for LineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLength {
    /// Creates the rule with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        let configuration = LineLengthConfiguration::default();
        Self {
            levels: SeverityLevelsConfiguration::new(configuration.warning, configuration.error),
            configuration,
            excluded_lines: Vec::new(),
        }
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn levels(mut self, warning: usize, error: Option<usize>) -> Self {
        self.configuration.warning = warning;
        self.configuration.error = error;
        self.levels = SeverityLevelsConfiguration::new(warning, error);
        self
    }

    /// Drops URLs before measuring.
    #[must_use]
    pub fn ignores_urls(mut self, ignore: bool) -> Self {
        self.configuration.ignores_urls = ignore;
        self
    }

    /// Skips comment-only lines.
    #[must_use]
    pub fn ignores_comments(mut self, ignore: bool) -> Self {
        self.configuration.ignores_comments = ignore;
        self
    }

    /// Lines whose 1-based index are skipped because of the tree.
    fn lines_skipped_by_tree(&self, file: &SwiftLintFile) -> BTreeSet<usize> {
        let options = &self.configuration;
        let mut skipped = BTreeSet::new();
        if !options.ignores_function_declarations && !options.ignores_interpolated_strings {
            return skipped;
        }
        let tree = match file.syntax_tree() {
            Ok(tree) => tree,
            Err(e) => {
                debug!("{}: line_length exclusions need a tree: {e}", file.display_name());
                return skipped;
            }
        };
        let converter = file.converter();
        let mut mark = |start, end| {
            let (first, _) = converter.location(start);
            let (last, _) = converter.location(end);
            skipped.extend(first..=last);
        };
        for node in tree.root().descendants() {
            let kind = node.kind();
            if options.ignores_function_declarations && FUNCTION_KINDS.contains(&kind) {
                let signature_end = node
                    .child_by_kind("function_body")
                    .map_or_else(|| node.end(), |body| body.start());
                mark(node.start(), signature_end);
            } else if options.ignores_interpolated_strings && kind == "interpolated_expression" {
                mark(node.start(), node.end());
            }
        }
        skipped
    }
}

/// Characters that count towards a line's length.
fn measured_length(content: &str, ignores_urls: bool) -> usize {
    let without_urls = if ignores_urls {
        URL.replace_all(content, "")
    } else {
        Cow::Borrowed(content)
    };
    OBJECT_LITERAL.replace_all(&without_urls, "#").chars().count()
}

impl Rule for LineLength {
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
        let options: LineLengthConfiguration = parse_rule_options(IDENTIFIER, value)?;
        let levels = checked_levels(IDENTIFIER, value, options.warning, options.error)?;
        let excluded_lines = options
            .excluded_lines_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidOption {
                    rule: IDENTIFIER.to_string(),
                    message: format!("invalid excluded_lines_patterns entry '{pattern}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.levels = levels;
        self.excluded_lines = excluded_lines;
        self.configuration = LineLengthConfiguration {
            error: levels.error,
            ..options
        };
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        let options = &self.configuration;
        let skipped = self.lines_skipped_by_tree(file);
        let coverage = options.ignores_comments.then(|| CommentCoverage::new(file));

        file.lines()
            .filter(|line| line.content.len() > self.levels.warning)
            .filter(|line| !skipped.contains(&line.index))
            .filter(|line| !coverage.as_ref().is_some_and(|c| c.is_comment_only(line)))
            .filter(|line| !self.excluded_lines.iter().any(|p| p.is_match(line.content)))
            .filter_map(|line| {
                let length = measured_length(line.content, options.ignores_urls);
                let severity = self.levels.severity_for(length)?;
                let threshold = self.levels.threshold_for(severity);
                Some(DESCRIPTION.violation_on_line(
                    file,
                    severity,
                    line.index,
                    None,
                    format!("Line should be {threshold} characters or less; currently it has {length} characters"),
                ))
            })
            .collect()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}
