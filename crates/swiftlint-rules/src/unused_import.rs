//! Analyzer rule flagging imports the compilation does not need.
//!
//! Uses the compiler invocation to learn the module being built. Importing
//! that module, or importing any module a second time, is reported.
//! `@_exported` imports and modules listed in `always_keep_imports` are left
//! alone.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use swiftlint_core::{
    parse_rule_options, rule_options_value, AnalyzerRule, ConfigError, Node, Position, Rule,
    RuleDescription, RuleKind, Severity, SwiftLintFile, Violation,
};

/// Rule identifier for unused-import.
pub const IDENTIFIER: &str = "unused_import";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: IDENTIFIER,
    name: "Unused Import",
    description: "All imported modules should be required to make the file compile",
    kind: RuleKind::Lint,
    opt_in: true,
    requires_tree: true,
};

/// Keywords that narrow an import to one symbol, e.g. `import struct Foo.Bar`.
const IMPORT_KINDS: &[&str] = &["typealias", "struct", "class", "enum", "protocol", "let", "var", "func"];

/// Options for [`UnusedImport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnusedImportConfiguration {
    /// Severity of violations.
    pub severity: Severity,
    /// Modules never reported.
    pub always_keep_imports: BTreeSet<String>,
}

impl Default for UnusedImportConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            always_keep_imports: BTreeSet::new(),
        }
    }
}

/// Flags redundant imports.
#[derive(Debug, Clone, Default)]
pub struct UnusedImport {
    configuration: UnusedImportConfiguration,
}

impl UnusedImport {
    /// Creates the rule with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The value following `-module-name`, if present.
fn module_name(arguments: &[String]) -> Option<&str> {
    arguments
        .iter()
        .position(|argument| argument == "-module-name")
        .and_then(|index| arguments.get(index + 1))
        .map(String::as_str)
}

struct Import<'a> {
    module: &'a str,
    position: Position,
    exported: bool,
}

fn parse_import(node: Node<'_>) -> Option<Import<'_>> {
    let text = node.text();
    let keyword_end = text.find("import")? + "import".len();
    let after_keyword = &text[keyword_end..];
    let path = after_keyword
        .split_whitespace()
        .find(|word| !IMPORT_KINDS.contains(word))?;
    let module = path.split('.').next()?;
    let offset = keyword_end + after_keyword.find(path)?;
    Some(Import {
        module,
        position: node.start().advanced_by(offset),
        exported: node
            .child_by_kind("modifiers")
            .is_some_and(|modifiers| modifiers.text().contains("@_exported")),
    })
}

impl Rule for UnusedImport {
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
        Vec::new()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }

    fn as_analyzer(&self) -> Option<&dyn AnalyzerRule> {
        Some(self)
    }
}

impl AnalyzerRule for UnusedImport {
    fn validate_with_arguments(&self, file: &SwiftLintFile, compiler_arguments: &[String]) -> Vec<Violation> {
        let Ok(tree) = file.syntax_tree() else {
            return Vec::new();
        };
        let current_module = module_name(compiler_arguments);
        let mut seen = BTreeSet::new();
        let mut violations = Vec::new();

        let imports = tree
            .root()
            .descendants()
            .filter(|node| node.kind() == "import_declaration")
            .filter_map(parse_import);
        for import in imports {
            let first_time = seen.insert(import.module);
            if import.exported || self.configuration.always_keep_imports.contains(import.module) {
                continue;
            }
            let reason = if current_module == Some(import.module) {
                "Importing the module being compiled is unnecessary".to_string()
            } else if !first_time {
                format!("Module '{}' is imported more than once", import.module)
            } else {
                continue;
            };
            violations.push(DESCRIPTION.violation_at(file, self.severity(), import.position, reason));
        }
        violations
    }
}
