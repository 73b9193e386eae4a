//! Rule flagging top-level declarations nothing refers to.
//!
//! Runs in two phases. Every file first reports the names it declares at
//! the top level and the identifiers it mentions; each declaration is then
//! checked against the identifiers of all linted files.
//!
//! Matching is by name, so an overload or a same-named member elsewhere
//! keeps a declaration alive.
//!
//! # Configuration
//!
//! - `severity` (default: error)
//! - `include_public_and_open`: also check `public` and `open` declarations
//!   (default: false)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    collecting_rule_misuse, parse_rule_options, rule_options_value, AnyCollectingRule,
    CollectedInfo, CollectingRule, ConfigError, Node, Position, Rule, RuleDescription, RuleKind,
    Severity, SwiftLintFile, Violation,
};

use tracing::debug;

use crate::support::declaration_keyword;

/// Rule identifier for unused-declaration.
pub const IDENTIFIER: &str = "unused_declaration";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Unused Declaration",
    description: "Declarations should be referenced at least once within all files linted",
    kind: RuleKind::Lint,
    opt_in: true,
    requires_tree: true,
};

const IDENTIFIER_KINDS: &[&str] = &["simple_identifier", "type_identifier"];

/// Attributes that make a declaration reachable from outside Swift code.
const ENTRY_POINT_ATTRIBUTES: &[&str] = &[
    "@main",
    "@objc",
    "@IBAction",
    "@IBOutlet",
    "@NSApplicationMain",
    "@UIApplicationMain",
];

/// Options for [`UnusedDeclaration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnusedDeclarationConfiguration {
    /// Severity of violations.
    pub severity: Severity,
    /// Whether `public` and `open` declarations are checked.
    pub include_public_and_open: bool,
}

impl Default for UnusedDeclarationConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
            include_public_and_open: false,
        }
    }
}

/// What one file declares and mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUsage {
    /// Top-level declarations: name and where the name sits.
    pub declared: Vec<(String, Position)>,
    /// Every identifier mentioned outside a declaration's own name.
    pub referenced: BTreeSet<String>,
}

/// Flags declarations that no linted file refers to.
#[derive(Debug, Clone, Default)]
pub struct UnusedDeclaration {
    configuration: UnusedDeclarationConfiguration,
}

impl UnusedDeclaration {
    /// Creates the rule with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `public` and `open` declarations are checked.
    #[must_use]
    pub fn include_public_and_open(mut self, include: bool) -> Self {
        self.configuration.include_public_and_open = include;
        self
    }

    fn usage(&self, file: &SwiftLintFile) -> FileUsage {
        let tree = match file.syntax_tree() {
            Ok(tree) => tree,
            Err(e) => {
                debug!("{}: no declarations collected: {e}", file.display_name());
                return FileUsage::default();
            }
        };
        let root = tree.root();

        let mut declared = Vec::new();
        let mut name_positions = BTreeSet::new();
        for declaration in root.children() {
            let Some(name) = declared_name(declaration) else {
                continue;
            };
            name_positions.insert(name.start());
            if self.is_exempt(declaration) {
                continue;
            }
            declared.push((name.text().to_string(), name.start()));
        }

        let referenced = root
            .descendants()
            .filter(|node| IDENTIFIER_KINDS.contains(&node.kind()))
            .filter(|node| !name_positions.contains(&node.start()))
            .map(|node| node.text().to_string())
            .collect();
        FileUsage { declared, referenced }
    }

    fn is_exempt(&self, declaration: Node<'_>) -> bool {
        let Some(modifiers) = declaration.child_by_kind("modifiers") else {
            return false;
        };
        modifiers.text().split_whitespace().any(|word| {
            let visible = !self.configuration.include_public_and_open && (word == "public" || word == "open");
            visible || ENTRY_POINT_ATTRIBUTES.iter().any(|attribute| word.starts_with(attribute))
        })
    }
}

/// The name node of a top-level type, function or property.
fn declared_name(declaration: Node<'_>) -> Option<Node<'_>> {
    match declaration.kind() {
        "class_declaration" => {
            if declaration_keyword(declaration).is_some_and(|keyword| keyword.text() == "extension") {
                return None;
            }
            declaration.child_by_kind("type_identifier")
        }
        "protocol_declaration" | "typealias_declaration" => declaration.child_by_kind("type_identifier"),
        "function_declaration" => declaration.child_by_kind("simple_identifier"),
        "property_declaration" => declaration
            .child_by_kind("pattern")
            .and_then(|pattern| pattern.descendants().find(|node| node.kind() == "simple_identifier")),
        _ => None,
    }
}

impl Rule for UnusedDeclaration {
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

    fn validate(&self, _file: &SwiftLintFile) -> Vec<Violation> {
        collecting_rule_misuse(IDENTIFIER)
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }

    fn as_collecting(&self) -> Option<&dyn AnyCollectingRule> {
        Some(self)
    }
}

impl CollectingRule for UnusedDeclaration {
    type FileInfo = FileUsage;

    fn collect_info(&self, file: &SwiftLintFile) -> Self::FileInfo {
        self.usage(file)
    }

    fn validate_collected(&self, file: &SwiftLintFile, collected: &CollectedInfo<Self::FileInfo>) -> Vec<Violation> {
        let Some(usage) = collected.get(file.id()) else {
            return Vec::new();
        };
        usage
            .declared
            .iter()
            .filter(|(name, _)| !collected.iter().any(|(_, other)| other.referenced.contains(name)))
            .map(|(_, position)| {
                DESCRIPTION.violation_at(file, self.severity(), *position, DESCRIPTION.description)
            })
            .collect()
    }
}
