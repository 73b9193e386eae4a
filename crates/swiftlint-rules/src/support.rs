//! Helpers shared by the built-in rules.

use swiftlint_core::{
    ByteRange, CommentKind, ConfigError, Line, Node, Position, SeverityLevelsConfiguration,
    SwiftLintFile,
};

/// Keywords that open a type, function or alias declaration.
const DECLARATION_KEYWORDS: &[&str] = &[
    "class",
    "struct",
    "enum",
    "extension",
    "actor",
    "protocol",
    "func",
    "init",
    "deinit",
    "typealias",
    "associatedtype",
];

/// The keyword token of a declaration, e.g. `struct` in `struct A {}`.
pub(crate) fn declaration_keyword(node: Node<'_>) -> Option<Node<'_>> {
    node.children()
        .find(|child| !child.is_named() && DECLARATION_KEYWORDS.contains(&child.text()))
}

/// Where a declaration is reported: its keyword, or its start.
pub(crate) fn keyword_position(node: Node<'_>) -> Position {
    declaration_keyword(node).map_or_else(|| node.start(), |keyword| keyword.start())
}

/// Validates a warning/error pair read from a rule's options.
///
/// A `value` that sets `warning` without `error` (including the `10` and
/// `[10]` shorthands) drops the default error threshold.
pub(crate) fn checked_levels(
    rule: &str,
    value: &toml::Value,
    warning: usize,
    error: Option<usize>,
) -> Result<SeverityLevelsConfiguration, ConfigError> {
    let error = match value {
        toml::Value::Integer(_) => None,
        toml::Value::Array(items) if items.len() < 2 => None,
        toml::Value::Table(table) if table.contains_key("warning") && !table.contains_key("error") => None,
        _ => error,
    };
    SeverityLevelsConfiguration::try_new(warning, error).map_err(|message| ConfigError::InvalidOption {
        rule: rule.to_string(),
        message,
    })
}

/// Byte spans of a file's comments, for line-by-line queries.
pub(crate) struct CommentCoverage {
    spans: Vec<(CommentKind, ByteRange)>,
}

impl CommentCoverage {
    pub(crate) fn new(file: &SwiftLintFile) -> Self {
        let mut spans: Vec<_> = file
            .comments()
            .iter()
            .map(|comment| (comment.kind, comment.span))
            .collect();
        spans.sort_by_key(|(_, span)| span.start);
        Self { spans }
    }

    /// Comments never overlap, so the last span starting at or before
    /// `offset` is the only candidate.
    fn covering(&self, offset: usize) -> Option<CommentKind> {
        let index = self.spans.partition_point(|(_, span)| span.start <= offset);
        let (kind, span) = self.spans.get(index.checked_sub(1)?)?;
        span.contains(offset).then_some(*kind)
    }

    /// True if the line has text and all of it is comment.
    pub(crate) fn is_comment_only(&self, line: &Line<'_>) -> bool {
        let mut offsets = non_whitespace_offsets(line).peekable();
        offsets.peek().is_some() && offsets.all(|offset| self.covering(offset).is_some())
    }

    /// True if the line has any comment text.
    #[cfg(test)]
    pub(crate) fn touches(&self, line: &Line<'_>) -> bool {
        non_whitespace_offsets(line).any(|offset| self.covering(offset).is_some())
    }

    /// True if the last non-whitespace character is inside a `//` comment.
    pub(crate) fn ends_in_line_comment(&self, line: &Line<'_>) -> bool {
        non_whitespace_offsets(line)
            .last()
            .is_some_and(|offset| self.covering(offset) == Some(CommentKind::Line))
    }

    /// True if the line sits entirely inside one block comment.
    pub(crate) fn inside_block_comment(&self, line: &Line<'_>) -> bool {
        let first = non_whitespace_offsets(line).next();
        let last = non_whitespace_offsets(line).last();
        self.spans
            .iter()
            .filter(|(kind, _)| *kind == CommentKind::Block)
            .any(|(_, span)| match (first, last) {
                (Some(first), Some(last)) => span.start <= first && last < span.end,
                _ => span.start <= line.range.start && line.range.end <= span.end,
            })
    }
}

fn non_whitespace_offsets<'a>(line: &'a Line<'a>) -> impl Iterator<Item = usize> + 'a {
    line.content
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .map(move |(index, _)| line.range.start + index)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use swiftlint_core::{Rule, SwiftLintFile, Violation};
    use swiftlint_syntax::SwiftParser;

    pub(crate) fn swift_file(source: &str) -> SwiftLintFile {
        SwiftLintFile::virtual_file(source, Arc::new(SwiftParser::new()))
    }

    pub(crate) fn violations(rule: &dyn Rule, source: &str) -> Vec<Violation> {
        rule.validate(&swift_file(source))
    }

    pub(crate) fn lines(violations: &[Violation]) -> Vec<usize> {
        violations.iter().map(|v| v.location.line).collect()
    }
}
