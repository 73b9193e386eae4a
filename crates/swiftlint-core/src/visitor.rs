//! Depth-first traversal harness for syntax rules.

use crate::file::SwiftLintFile;
use crate::rule::Rule;
use crate::syntax::{Node, SyntaxTree};
use crate::types::{ReasonedRuleViolation, Violation};

/// What to do after entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    /// Descend into the children.
    VisitChildren,
    /// Skip the children; `visit_post` still runs for this node.
    SkipChildren,
}

/// Per-node callbacks driven by [`walk`].
pub trait SyntaxVisitor {
    /// Called on entering a node.
    fn visit(&mut self, _node: Node<'_>) -> VisitAction {
        VisitAction::VisitChildren
    }

    /// Called on leaving a node, after its children.
    fn visit_post(&mut self, _node: Node<'_>) {}

    /// Node kinds skipped together with their subtrees. Neither callback
    /// runs for them.
    fn skippable_kinds(&self) -> &[&'static str] {
        &[]
    }
}

enum Step<'a> {
    Enter(Node<'a>),
    Leave(Node<'a>),
}

/// Walks `root` and its descendants in pre/post order without recursion.
pub fn walk<V: SyntaxVisitor + ?Sized>(root: Node<'_>, visitor: &mut V) {
    let mut stack = vec![Step::Enter(root)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node) => {
                if visitor.skippable_kinds().contains(&node.kind()) {
                    continue;
                }
                let action = visitor.visit(node);
                stack.push(Step::Leave(node));
                if action == VisitAction::VisitChildren {
                    stack.extend(node.children().rev().map(Step::Enter));
                }
            }
            Step::Leave(node) => visitor.visit_post(node),
        }
    }
}

/// Append-only collection of violations found during a walk.
#[derive(Debug, Default)]
pub struct ViolationSink {
    violations: Vec<ReasonedRuleViolation>,
}

impl ViolationSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: ReasonedRuleViolation) {
        self.violations.push(violation);
    }

    /// Number of violations so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes the sink.
    #[must_use]
    pub fn into_violations(self) -> Vec<ReasonedRuleViolation> {
        self.violations
    }
}

/// A rule whose checks are a walk over the syntax tree.
pub trait SyntaxRule: Rule {
    /// Walks `tree` and returns what was found, in any order.
    fn collect_violations(&self, file: &SwiftLintFile, tree: &SyntaxTree) -> Vec<ReasonedRuleViolation>;
}

/// Default [`Rule::validate`] for syntax rules.
///
/// Attaches rule metadata, applies the configured severity unless a
/// violation overrides it, and sorts by position. Files without a tree
/// yield nothing.
#[must_use]
pub fn validate_syntax_rule<R: SyntaxRule + ?Sized>(rule: &R, file: &SwiftLintFile) -> Vec<Violation> {
    let Ok(tree) = file.syntax_tree() else {
        return Vec::new();
    };
    let description = rule.description();
    let mut violations: Vec<Violation> = rule
        .collect_violations(file, &tree)
        .into_iter()
        .map(|reasoned| {
            let severity = reasoned.severity.unwrap_or_else(|| rule.severity());
            let reason = reasoned
                .reason
                .unwrap_or_else(|| description.description.to_string());
            let mut violation = description.violation_at(file, severity, reasoned.position, reason);
            if let Some((range, replacement)) = reasoned.correction {
                violation = violation.with_correction(crate::types::Correction {
                    rule_id: description.identifier.to_string(),
                    location: file.location(range.start_position()),
                    range,
                    replacement,
                });
            }
            violation
        })
        .collect();
    violations.sort_by_key(|v| v.position);
    violations
}
