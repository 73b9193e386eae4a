//! Swift parsing with tree-sitter.

use swiftlint_core::{ParseError, SourceParser, SyntaxTree, SyntaxTreeBuilder};
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

/// Parses Swift source into the engine's syntax tree.
///
/// Trees containing `ERROR` or missing nodes are still returned; only input
/// the grammar cannot recover from at all is a [`ParseError`].
pub struct SwiftParser {
    language: Language,
}

impl SwiftParser {
    /// Creates a new Swift parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_swift::LANGUAGE.into(),
        }
    }
}

impl Default for SwiftParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SwiftParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftParser").finish_non_exhaustive()
    }
}

impl SourceParser for SwiftParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        // tree_sitter::Parser is not Sync, so each call gets its own.
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::new(format!("failed to load the Swift grammar: {e}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new("the parser produced no tree"))?;

        let root = tree.root_node();
        if root.is_error() {
            return Err(ParseError::new(describe(root, "unrecognized input")));
        }
        if root.has_error() {
            if let Some(node) = first_error(root) {
                debug!("Recovered from {}", describe(node, "syntax error"));
            }
        }
        Ok(copy_tree(source, &tree))
    }
}

fn describe(node: Node<'_>, what: &str) -> String {
    let start = node.start_position();
    let what = if node.is_missing() { "missing token" } else { what };
    format!("{what} at line {}, column {}", start.row + 1, start.column + 1)
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Copies every node, named or not, in document order.
fn copy_tree(source: &str, tree: &Tree) -> SyntaxTree {
    let mut builder = SyntaxTreeBuilder::new(source);
    let mut cursor = tree.walk();
    'walk: loop {
        let node = cursor.node();
        if node.child_count() == 0 {
            builder.leaf(node.kind(), node.is_named(), node.start_byte(), node.end_byte());
        } else {
            builder.start_node(node.kind(), node.is_named(), node.start_byte());
            if cursor.goto_first_child() {
                continue;
            }
            builder.finish_node(node.end_byte());
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
            builder.finish_node(cursor.node().end_byte());
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlint_core::CommentKind;

    fn parse(source: &str) -> SyntaxTree {
        SwiftParser::new().parse(source).unwrap()
    }

    #[test]
    fn root_is_a_source_file() {
        let tree = parse("let x = 1\n");
        assert_eq!(tree.root().kind(), "source_file");
        assert!(!tree.has_errors());
    }

    #[test]
    fn empty_source_parses() {
        let tree = parse("");
        assert_eq!(tree.root().text(), "");
    }

    #[test]
    fn spans_match_the_source() {
        let source = "class A {\n    struct B {}\n}\nlet x = y as! Int\n";
        let tree = parse(source);
        for node in tree.root().descendants() {
            let span = node.span();
            assert_eq!(node.text(), &source[span.start..span.end]);
            if let Some(parent) = node.parent() {
                assert!(parent.start() <= node.start() && node.end() <= parent.end());
            }
        }
    }

    #[test]
    fn keeps_anonymous_tokens() {
        let tree = parse("let x = y as! Int\n");
        assert!(tree
            .root()
            .descendants()
            .any(|node| node.child_count() == 0 && node.text() == "as!"));
    }

    #[test]
    fn finds_nested_declarations() {
        let tree = parse("class A {\n    struct B {\n        enum C {}\n    }\n}\n");
        let declarations = tree
            .root()
            .descendants()
            .filter(|node| node.kind() == "class_declaration")
            .count();
        assert_eq!(declarations, 3);
    }

    #[test]
    fn exposes_line_and_block_comments() {
        let tree = parse("// swiftlint:disable force_cast\nlet x = 1 /* note */\n");
        let comments = tree.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kind, CommentKind::Line);
        assert_eq!(comments[0].text, "// swiftlint:disable force_cast");
        assert_eq!(comments[1].kind, CommentKind::Block);
    }

    #[test]
    fn broken_input_is_recovered_or_rejected() {
        match SwiftParser::new().parse("func f( {\nlet = = 1 }}}\n") {
            Ok(tree) => assert!(tree.has_errors()),
            Err(error) => assert!(error.to_string().contains("line")),
        }
    }
}
