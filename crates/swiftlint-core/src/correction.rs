//! Correction harnesses.
//!
//! A correctable rule picks one of two strategies:
//!
//! - **rewrite**: replace whole syntax nodes; the harness re-serializes the
//!   tree by copying untouched text and splicing in replacements
//! - **substitution**: list byte ranges and their replacement text; the
//!   harness applies them to one copy of the text from the highest offset
//!   down, so earlier offsets stay valid
//!
//! Neither writes the file. The linter writes the returned contents once.

use crate::file::SwiftLintFile;
use crate::location::ByteRange;
use crate::rule::{CorrectionStrategy, Rule};
use crate::syntax::Node;
use crate::types::Correction;
use tracing::debug;

/// Rewrites syntax nodes.
pub trait SyntaxRewriteRule: Send + Sync {
    /// Replacement text for the whole of `node`, or `None` to leave it and
    /// look at its children.
    fn rewrite(&self, node: Node<'_>, file: &SwiftLintFile) -> Option<String>;

    /// Node kinds never rewritten or descended into.
    fn skippable_kinds(&self) -> &[&'static str] {
        &[]
    }
}

/// Fixes violations by replacing byte ranges.
pub trait SubstitutionCorrectableRule: Send + Sync {
    /// Ranges that violate the rule.
    fn violation_ranges(&self, file: &SwiftLintFile) -> Vec<ByteRange>;

    /// The range to replace for one violation and its new text. May differ
    /// from the violation range.
    fn substitution(&self, range: ByteRange, file: &SwiftLintFile) -> Option<(ByteRange, String)>;
}

/// What one correction pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionOutcome {
    /// Applied corrections in ascending position order.
    pub corrections: Vec<Correction>,
    /// New file text, `None` when nothing changed.
    pub contents: Option<String>,
}

impl CorrectionOutcome {
    fn unchanged() -> Self {
        Self::default()
    }
}

/// Computes corrections for one rule against the file's current text.
///
/// Ranges and nodes inside regions that disable the rule are left alone.
/// Files that fail to parse are left alone by rewrite rules.
///
/// # Panics
///
/// Panics if `rule` is not correctable.
#[must_use]
pub fn correct(rule: &dyn Rule, file: &SwiftLintFile) -> CorrectionOutcome {
    let Some(correctable) = rule.as_correctable() else {
        panic!("'{}' is not a correctable rule", rule.identifier());
    };
    match correctable.correction_strategy() {
        CorrectionStrategy::Rewrite(rewriter) => rewrite(rule.identifier(), rewriter, file),
        CorrectionStrategy::Substitution(substitution) => {
            substitute(rule.identifier(), substitution, file)
        }
    }
}

fn rewrite(rule_id: &str, rewriter: &dyn SyntaxRewriteRule, file: &SwiftLintFile) -> CorrectionOutcome {
    let tree = match file.syntax_tree() {
        Ok(tree) => tree,
        Err(e) => {
            debug!("{}: not rewriting for '{rule_id}': {e}", file.display_name());
            return CorrectionOutcome::unchanged();
        }
    };
    let source = tree.source();
    let mut output = String::with_capacity(source.len());
    let mut copied_up_to = 0;
    let mut corrections = Vec::new();

    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        let span = node.span();
        if span.start < copied_up_to
            || rewriter.skippable_kinds().contains(&node.kind())
            || !file.is_rule_enabled_at(rule_id, node.start())
        {
            continue;
        }
        match rewriter.rewrite(node, file) {
            Some(replacement) if replacement != node.text() => {
                output.push_str(&source[copied_up_to..span.start]);
                output.push_str(&replacement);
                copied_up_to = span.end;
                corrections.push(Correction {
                    rule_id: rule_id.to_string(),
                    location: file.location(node.start()),
                    range: span,
                    replacement,
                });
            }
            Some(_) => {}
            None => stack.extend(node.children().rev()),
        }
    }

    if corrections.is_empty() {
        return CorrectionOutcome::unchanged();
    }
    output.push_str(&source[copied_up_to..]);
    CorrectionOutcome {
        corrections,
        contents: Some(output),
    }
}

fn substitute(
    rule_id: &str,
    rule: &dyn SubstitutionCorrectableRule,
    file: &SwiftLintFile,
) -> CorrectionOutcome {
    let mut substitutions: Vec<(ByteRange, String)> = rule
        .violation_ranges(file)
        .into_iter()
        .filter(|range| file.is_rule_enabled_at(rule_id, range.start_position()))
        .filter_map(|range| rule.substitution(range, file))
        .filter(|(range, replacement)| file.contents().get(range.start..range.end) != Some(replacement.as_str()))
        .collect();
    substitutions.sort_by(|a, b| b.0.cmp(&a.0));

    let mut contents = file.contents().to_string();
    let mut lowest_applied = usize::MAX;
    let mut corrections = Vec::new();
    for (range, replacement) in substitutions {
        if range.end > lowest_applied || contents.get(range.start..range.end).is_none() {
            continue;
        }
        contents.replace_range(range.start..range.end, &replacement);
        lowest_applied = range.start;
        corrections.push(Correction {
            rule_id: rule_id.to_string(),
            location: file.location(range.start_position()),
            range,
            replacement,
        });
    }

    if corrections.is_empty() {
        return CorrectionOutcome::unchanged();
    }
    corrections.reverse();
    CorrectionOutcome {
        corrections,
        contents: Some(contents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::location::Position;
    use crate::rule::{CorrectableRule, RuleDescription, RuleKind};
    use crate::syntax::{scan_comments, ParseError, SourceParser, SyntaxTree, SyntaxTreeBuilder};
    use crate::types::{Severity, Violation};
    use std::sync::Arc;

    /// Splits text into `word` leaves separated by gaps, plus comments.
    struct WordParser;

    impl SourceParser for WordParser {
        fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
            let comments = scan_comments(source);
            let mut leaves: Vec<(&'static str, ByteRange)> = comments
                .iter()
                .map(|c| ("comment", c.span))
                .collect();
            let mut offset = 0;
            for word in source.split(|c: char| c.is_whitespace()) {
                let start = offset;
                offset += word.len() + 1;
                if word.is_empty() || comments.iter().any(|c| c.span.contains(start)) {
                    continue;
                }
                leaves.push(("word", ByteRange::new(start, start + word.len())));
            }
            leaves.sort_by_key(|(_, span)| span.start);

            let mut builder = SyntaxTreeBuilder::new(source);
            builder.start_node("source_file", true, 0);
            for (kind, span) in leaves {
                builder.leaf(kind, true, span.start, span.end);
            }
            builder.finish_node(source.len());
            Ok(builder.finish())
        }
    }

    static SHOUT: RuleDescription = RuleDescription {
        identifier: "shout",
        name: "Shout",
        description: "Words should be upper case",
        kind: RuleKind::Style,
        opt_in: false,
        requires_tree: true,
    };

    static TRAILING: RuleDescription = RuleDescription {
        identifier: "trailing",
        name: "Trailing",
        description: "Lines should not end with spaces",
        kind: RuleKind::Style,
        opt_in: false,
        requires_tree: false,
    };

    #[derive(Clone, Copy)]
    struct TestRule {
        description: &'static RuleDescription,
        correctable: bool,
    }

    impl Rule for TestRule {
        fn description(&self) -> &'static RuleDescription {
            self.description
        }
        fn severity(&self) -> Severity {
            Severity::Warning
        }
        fn configuration_value(&self) -> toml::Value {
            toml::Value::Boolean(self.correctable)
        }
        fn apply_configuration(&mut self, _: &toml::Value) -> Result<(), ConfigError> {
            Ok(())
        }
        fn validate(&self, _: &SwiftLintFile) -> Vec<Violation> {
            Vec::new()
        }
        fn box_clone(&self) -> Box<dyn Rule> {
            Box::new(*self)
        }
        fn as_correctable(&self) -> Option<&dyn CorrectableRule> {
            self.correctable.then_some(self as &dyn CorrectableRule)
        }
    }

    impl CorrectableRule for TestRule {
        fn correction_strategy(&self) -> CorrectionStrategy<'_> {
            if std::ptr::eq(self.description, &SHOUT) {
                CorrectionStrategy::Rewrite(self)
            } else {
                CorrectionStrategy::Substitution(self)
            }
        }
    }

    impl SyntaxRewriteRule for TestRule {
        fn rewrite(&self, node: Node<'_>, _: &SwiftLintFile) -> Option<String> {
            (node.kind() == "word").then(|| node.text().to_uppercase())
        }
    }

    impl SubstitutionCorrectableRule for TestRule {
        fn violation_ranges(&self, file: &SwiftLintFile) -> Vec<ByteRange> {
            file.lines()
                .filter_map(|line| {
                    let trimmed = line.content.trim_end_matches(' ').len();
                    (trimmed < line.content.len())
                        .then(|| ByteRange::new(line.range.start + trimmed, line.range.start + line.content.len()))
                })
                .collect()
        }

        fn substitution(&self, range: ByteRange, _: &SwiftLintFile) -> Option<(ByteRange, String)> {
            Some((range, String::new()))
        }
    }

    fn file(text: &str) -> SwiftLintFile {
        SwiftLintFile::virtual_file(text, Arc::new(WordParser))
    }

    fn shout() -> TestRule {
        TestRule {
            description: &SHOUT,
            correctable: true,
        }
    }

    fn trailing() -> TestRule {
        TestRule {
            description: &TRAILING,
            correctable: true,
        }
    }

    #[test]
    fn rewrite_replaces_nodes_and_keeps_gaps() {
        let f = file("let  a = b\n");
        let outcome = correct(&shout(), &f);
        assert_eq!(outcome.contents.as_deref(), Some("LET  A = B\n"));
        // "=" is unchanged by upper-casing, so only three words count.
        assert_eq!(outcome.corrections.len(), 3);
        assert_eq!(outcome.corrections[1].location.character, Some(6));
    }

    #[test]
    fn rewrite_leaves_disabled_regions_alone() {
        let f = file("one\n// swiftlint:disable:next shout\ntwo\nthree\n");
        let outcome = correct(&shout(), &f);
        assert_eq!(
            outcome.contents.as_deref(),
            Some("ONE\n// swiftlint:disable:next shout\ntwo\nTHREE\n")
        );
    }

    #[test]
    fn nothing_to_rewrite_is_success() {
        let f = file("ALREADY LOUD\n");
        assert_eq!(correct(&shout(), &f), CorrectionOutcome::default());
    }

    #[test]
    fn substitutions_apply_from_the_end_and_report_ascending() {
        let f = file("a  \nb \nc\n");
        let outcome = correct(&trailing(), &f);
        assert_eq!(outcome.contents.as_deref(), Some("a\nb\nc\n"));
        let lines: Vec<_> = outcome.corrections.iter().map(|c| c.location.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(outcome.corrections[0].range, ByteRange::new(1, 3));
    }

    #[test]
    fn substitutions_skip_disabled_ranges() {
        let f = file("a \n// swiftlint:disable trailing\nb \n");
        let outcome = correct(&trailing(), &f);
        assert_eq!(
            outcome.contents.as_deref(),
            Some("a\n// swiftlint:disable trailing\nb \n")
        );
        assert_eq!(outcome.corrections.len(), 1);
    }

    #[test]
    fn substitution_is_idempotent() {
        let f = file("x \ny  \n");
        let first = correct(&trailing(), &f);
        let corrected = file(first.contents.as_deref().unwrap());
        let second = correct(&trailing(), &corrected);
        assert!(second.corrections.is_empty());
        assert!(second.contents.is_none());
        assert_eq!(trailing().violation_ranges(&corrected), Vec::new());
        assert_eq!(corrected.location(Position(0)).line, 1);
    }

    #[test]
    #[should_panic(expected = "is not a correctable rule")]
    fn correcting_a_plain_rule_panics() {
        let plain = TestRule {
            description: &SHOUT,
            correctable: false,
        };
        let _ = correct(&plain, &file("a\n"));
    }
}
