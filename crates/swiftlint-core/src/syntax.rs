//! Owned, position-addressable syntax trees.
//!
//! Parsers are external collaborators: anything implementing
//! [`SourceParser`] hands back a [`SyntaxTree`], built through
//! [`SyntaxTreeBuilder`]. The tree is immutable once built and is shared by
//! every rule that inspects the file.

use crate::location::{ByteRange, Position};
use thiserror::Error;

/// Node kinds treated as line comments.
pub const LINE_COMMENT_KIND: &str = "comment";

/// Node kinds treated as block comments.
pub const BLOCK_COMMENT_KIND: &str = "multiline_comment";

/// Kind used by parsers for error-recovery nodes.
pub const ERROR_KIND: &str = "ERROR";

/// A source file could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Parser-provided description of the failure.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces syntax trees from source text.
pub trait SourceParser: Send + Sync {
    /// Parses `source` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when no usable tree can be produced.
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    named: bool,
    span: ByteRange,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// An immutable syntax tree over one file's text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Returns the root node.
    ///
    /// # Panics
    ///
    /// Never panics for trees produced by [`SyntaxTreeBuilder`], which always
    /// create a root.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        assert!(!self.nodes.is_empty(), "syntax tree has no root node");
        Node { tree: self, id: 0 }
    }

    /// Text the tree was built from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if the parser had to recover from errors anywhere.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == ERROR_KIND)
    }

    /// Comment trivia in source order.
    #[must_use]
    pub fn comments(&self) -> Vec<Comment> {
        self.root()
            .descendants()
            .filter_map(|node| {
                let kind = match node.kind() {
                    LINE_COMMENT_KIND => CommentKind::Line,
                    BLOCK_COMMENT_KIND => CommentKind::Block,
                    _ => return None,
                };
                Some(Comment {
                    kind,
                    span: node.span(),
                    text: node.text().to_string(),
                })
            })
            .collect()
    }

    fn node(&self, id: usize) -> &NodeData {
        &self.nodes[id]
    }
}

/// A lightweight handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree,
    id: usize,
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.span().start, self.span().end)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'a> Node<'a> {
    /// Arena index, stable for the lifetime of the tree.
    #[must_use]
    pub fn id(self) -> usize {
        self.id
    }

    /// Grammar kind tag.
    #[must_use]
    pub fn kind(self) -> &'static str {
        self.tree.node(self.id).kind
    }

    /// Whether the grammar names this node (as opposed to punctuation).
    #[must_use]
    pub fn is_named(self) -> bool {
        self.tree.node(self.id).named
    }

    /// Returns true for error-recovery nodes.
    #[must_use]
    pub fn is_error(self) -> bool {
        self.kind() == ERROR_KIND
    }

    /// Byte span of this node.
    #[must_use]
    pub fn span(self) -> ByteRange {
        self.tree.node(self.id).span
    }

    /// Start position of this node.
    #[must_use]
    pub fn start(self) -> Position {
        Position(self.span().start)
    }

    /// End position of this node.
    #[must_use]
    pub fn end(self) -> Position {
        Position(self.span().end)
    }

    /// Source text covered by this node.
    #[must_use]
    pub fn text(self) -> &'a str {
        let span = self.span();
        self.tree.source.get(span.start..span.end).unwrap_or("")
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Node<'a>> {
        self.tree.node(self.id).parent.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Direct children in source order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        tree.node(self.id)
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Direct named children in source order.
    pub fn named_children(self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(|c| c.is_named())
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.tree.node(self.id).children.len()
    }

    /// First direct child with the given kind.
    #[must_use]
    pub fn child_by_kind(self, kind: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// All nodes below this one in pre-order, excluding itself.
    pub fn descendants(self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        let mut stack: Vec<usize> = tree.node(self.id).children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.node(id).children.iter().rev().copied());
            Some(Node { tree, id })
        })
    }

    /// Parent chain from the direct parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = Node<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }
}

/// Whether a comment is `//` or `/* */`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// One piece of comment trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Line or block.
    pub kind: CommentKind,
    /// Byte span including the delimiters.
    pub span: ByteRange,
    /// Raw comment text.
    pub text: String,
}

/// Incrementally builds a [`SyntaxTree`] from a pre-order event stream.
///
/// ```
/// use swiftlint_core::SyntaxTreeBuilder;
///
/// let source = "let x = y as! Int\n";
/// let mut builder = SyntaxTreeBuilder::new(source);
/// builder.start_node("source_file", true, 0);
/// builder.leaf("as!", false, 10, 13);
/// builder.finish_node(source.len());
/// let tree = builder.finish();
/// assert_eq!(tree.root().children().next().unwrap().text(), "as!");
/// ```
#[derive(Debug)]
pub struct SyntaxTreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
    stack: Vec<usize>,
}

impl SyntaxTreeBuilder {
    /// Starts a builder over `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Opens an interior node starting at byte `start`.
    pub fn start_node(&mut self, kind: &'static str, named: bool, start: usize) -> &mut Self {
        let id = self.push(kind, named, ByteRange::new(start, start));
        self.stack.push(id);
        self
    }

    /// Closes the most recently opened node at byte `end`.
    pub fn finish_node(&mut self, end: usize) -> &mut Self {
        if let Some(id) = self.stack.pop() {
            self.nodes[id].span.end = end;
        }
        self
    }

    /// Adds a childless node.
    pub fn leaf(&mut self, kind: &'static str, named: bool, start: usize, end: usize) -> &mut Self {
        self.push(kind, named, ByteRange::new(start, end));
        self
    }

    /// Finishes the tree, closing any nodes left open at end of input.
    #[must_use]
    pub fn finish(mut self) -> SyntaxTree {
        let len = self.source.len();
        while let Some(id) = self.stack.pop() {
            self.nodes[id].span.end = len;
        }
        if self.nodes.is_empty() {
            self.push("source_file", true, ByteRange::new(0, len));
        }
        SyntaxTree {
            source: self.source,
            nodes: self.nodes,
        }
    }

    fn push(&mut self, kind: &'static str, named: bool, span: ByteRange) -> usize {
        let id = self.nodes.len();
        let parent = self.stack.last().copied();
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        self.nodes.push(NodeData {
            kind,
            named,
            span,
            parent,
            children: Vec::new(),
        });
        id
    }
}

/// Finds comments lexically, for files that have no tree.
///
/// String literals (including `"""` multi-line literals) are skipped and
/// block comments nest, as they do in Swift.
#[must_use]
pub fn scan_comments(text: &str) -> Vec<Comment> {
    let bytes = text.as_bytes();
    let mut comments = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = text[i..].find('\n').map_or(bytes.len(), |n| i + n);
                comments.push(make_comment(text, CommentKind::Line, i, end));
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = skip_block_comment(bytes, i);
                comments.push(make_comment(text, CommentKind::Block, i, end));
                i = end;
            }
            _ => i += 1,
        }
    }
    comments
}

fn make_comment(text: &str, kind: CommentKind, start: usize, end: usize) -> Comment {
    Comment {
        kind,
        span: ByteRange::new(start, end),
        text: text[start..end].to_string(),
    }
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let multiline = bytes[start..].starts_with(b"\"\"\"");
    let mut i = start + if multiline { 3 } else { 1 };
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' if multiline && bytes[i..].starts_with(b"\"\"\"") => return i + 3,
            b'"' if !multiline => return i + 1,
            b'\n' if !multiline => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}
