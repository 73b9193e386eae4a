//! Parsers and rules shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use swiftlint_core::{
    collecting_rule_misuse, parse_rule_options, rule_options_value, scan_comments, AnalyzerRule,
    AnyCollectingRule, ByteRange, CollectedInfo, CollectingRule, ConfigError, CorrectableRule,
    CorrectionStrategy, ParseError, Position, Rule, RuleDescription, RuleKind, RuleRegistry,
    Severity, SeverityConfiguration, SourceParser, SubstitutionCorrectableRule,
    SuperfluousDisableCommandRule, SwiftLintFile, SyntaxTree, SyntaxTreeBuilder, Violation,
};

/// Produces a root node with one leaf per comment; fails on `@@`.
pub struct FlatParser;

impl SourceParser for FlatParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        if source.contains("@@") {
            return Err(ParseError::new("unexpected '@@'"));
        }
        let mut builder = SyntaxTreeBuilder::new(source);
        builder.start_node("source_file", true, 0);
        for comment in scan_comments(source) {
            builder.leaf("comment", true, comment.span.start, comment.span.end);
        }
        builder.finish_node(source.len());
        Ok(builder.finish())
    }
}

pub fn parser() -> Arc<dyn SourceParser> {
    Arc::new(FlatParser)
}

pub fn file(contents: &str) -> SwiftLintFile {
    SwiftLintFile::virtual_file(contents, parser())
}

pub static FORCE_CAST: RuleDescription = RuleDescription {
    identifier: "force_cast",
    name: "Force Cast",
    description: "Force casts should be avoided",
    kind: RuleKind::Idiomatic,
    opt_in: false,
    requires_tree: false,
};

pub static FORCE_TRY: RuleDescription = RuleDescription {
    identifier: "force_try",
    name: "Force Try",
    description: "Force tries should be avoided",
    kind: RuleKind::Idiomatic,
    opt_in: false,
    requires_tree: false,
};

pub static TODO: RuleDescription = RuleDescription {
    identifier: "todo",
    name: "Todo",
    description: "TODOs should be resolved",
    kind: RuleKind::Lint,
    opt_in: false,
    requires_tree: true,
};

/// Reports every occurrence of a token.
#[derive(Clone)]
pub struct TokenRule {
    description: &'static RuleDescription,
    token: &'static str,
    configuration: SeverityConfiguration,
}

impl TokenRule {
    pub fn force_cast() -> Self {
        Self::new(&FORCE_CAST, "as!", Severity::Error)
    }

    pub fn force_try() -> Self {
        Self::new(&FORCE_TRY, "try!", Severity::Error)
    }

    pub fn todo() -> Self {
        Self::new(&TODO, "TODO", Severity::Warning)
    }

    fn new(description: &'static RuleDescription, token: &'static str, severity: Severity) -> Self {
        Self {
            description,
            token,
            configuration: SeverityConfiguration::new(severity),
        }
    }
}

impl Rule for TokenRule {
    fn description(&self) -> &'static RuleDescription {
        self.description
    }

    fn severity(&self) -> Severity {
        self.configuration.severity
    }

    fn configuration_value(&self) -> toml::Value {
        rule_options_value(&self.configuration)
    }

    fn apply_configuration(&mut self, value: &toml::Value) -> Result<(), ConfigError> {
        self.configuration = parse_rule_options(self.identifier(), value)?;
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        file.contents()
            .match_indices(self.token)
            .map(|(offset, _)| {
                self.description.violation_at(
                    file,
                    self.severity(),
                    Position(offset),
                    self.description.description,
                )
            })
            .collect()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

static NO_SEMICOLONS: RuleDescription = RuleDescription {
    identifier: "no_semicolons",
    name: "No Semicolons",
    description: "Lines should not end with a semicolon",
    kind: RuleKind::Style,
    opt_in: false,
    requires_tree: false,
};

/// Flags and removes a semicolon at the end of a line.
#[derive(Clone, Default)]
pub struct NoSemicolonsRule;

impl Rule for NoSemicolonsRule {
    fn description(&self) -> &'static RuleDescription {
        &NO_SEMICOLONS
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn configuration_value(&self) -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    fn apply_configuration(&mut self, _: &toml::Value) -> Result<(), ConfigError> {
        Ok(())
    }

    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
        self.violation_ranges(file)
            .into_iter()
            .map(|range| {
                NO_SEMICOLONS.violation_at(
                    file,
                    self.severity(),
                    range.start_position(),
                    NO_SEMICOLONS.description,
                )
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

impl CorrectableRule for NoSemicolonsRule {
    fn correction_strategy(&self) -> CorrectionStrategy<'_> {
        CorrectionStrategy::Substitution(self)
    }
}

impl SubstitutionCorrectableRule for NoSemicolonsRule {
    fn violation_ranges(&self, file: &SwiftLintFile) -> Vec<ByteRange> {
        file.lines()
            .filter(|line| line.content.ends_with(';'))
            .map(|line| {
                let end = line.range.start + line.content.len();
                ByteRange::new(end - 1, end)
            })
            .collect()
    }

    fn substitution(&self, range: ByteRange, _: &SwiftLintFile) -> Option<(ByteRange, String)> {
        Some((range, String::new()))
    }
}

static DUPLICATE_CLASS: RuleDescription = RuleDescription {
    identifier: "duplicate_class",
    name: "Duplicate Class",
    description: "Class names should be unique across files",
    kind: RuleKind::Lint,
    opt_in: false,
    requires_tree: false,
};

/// Flags `class X` declarations that another file also declares.
#[derive(Clone, Default)]
pub struct DuplicateClassRule;

impl DuplicateClassRule {
    fn declarations(file: &SwiftLintFile) -> Vec<(Position, String)> {
        file.contents()
            .match_indices("class ")
            .filter_map(|(offset, keyword)| {
                let rest = &file.contents()[offset + keyword.len()..];
                let name: String = rest.chars().take_while(|c| c.is_alphanumeric()).collect();
                (!name.is_empty()).then(|| (Position(offset + keyword.len()), name))
            })
            .collect()
    }
}

impl Rule for DuplicateClassRule {
    fn description(&self) -> &'static RuleDescription {
        &DUPLICATE_CLASS
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn configuration_value(&self) -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    fn apply_configuration(&mut self, _: &toml::Value) -> Result<(), ConfigError> {
        Ok(())
    }

    fn validate(&self, _: &SwiftLintFile) -> Vec<Violation> {
        collecting_rule_misuse(self.identifier())
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }

    fn as_collecting(&self) -> Option<&dyn AnyCollectingRule> {
        Some(self)
    }
}

impl CollectingRule for DuplicateClassRule {
    type FileInfo = BTreeSet<String>;

    fn collect_info(&self, file: &SwiftLintFile) -> Self::FileInfo {
        Self::declarations(file).into_iter().map(|(_, name)| name).collect()
    }

    fn validate_collected(
        &self,
        file: &SwiftLintFile,
        collected: &CollectedInfo<Self::FileInfo>,
    ) -> Vec<Violation> {
        Self::declarations(file)
            .into_iter()
            .filter_map(|(position, name)| {
                let others = collected
                    .iter()
                    .filter(|(id, names)| *id != file.id() && names.contains(&name))
                    .count();
                (others > 0).then(|| {
                    DUPLICATE_CLASS.violation_at(
                        file,
                        self.severity(),
                        position,
                        format!("'{name}' is also declared in {others} other file(s)"),
                    )
                })
            })
            .collect()
    }
}

static MODULE_FLAG: RuleDescription = RuleDescription {
    identifier: "module_flag",
    name: "Module Flag",
    description: "Files should be compiled with -module-name",
    kind: RuleKind::Lint,
    opt_in: false,
    requires_tree: false,
};

/// Analyzer rule reporting on line 1 when `-module-name` is missing.
#[derive(Clone, Default)]
pub struct ModuleFlagRule;

impl Rule for ModuleFlagRule {
    fn description(&self) -> &'static RuleDescription {
        &MODULE_FLAG
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn configuration_value(&self) -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    fn apply_configuration(&mut self, _: &toml::Value) -> Result<(), ConfigError> {
        Ok(())
    }

    fn validate(&self, _: &SwiftLintFile) -> Vec<Violation> {
        Vec::new()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }

    fn as_analyzer(&self) -> Option<&dyn AnalyzerRule> {
        Some(self)
    }
}

impl AnalyzerRule for ModuleFlagRule {
    fn validate_with_arguments(&self, file: &SwiftLintFile, arguments: &[String]) -> Vec<Violation> {
        if arguments.iter().any(|a| a == "-module-name") {
            return Vec::new();
        }
        vec![MODULE_FLAG.violation_on_line(file, self.severity(), 1, None, MODULE_FLAG.description)]
    }
}

pub fn registry() -> RuleRegistry {
    RuleRegistry::builder()
        .register(|| Box::new(TokenRule::force_cast()))
        .register(|| Box::new(TokenRule::force_try()))
        .register(|| Box::new(TokenRule::todo()))
        .register(|| Box::new(NoSemicolonsRule))
        .register(|| Box::new(DuplicateClassRule))
        .register(|| Box::new(ModuleFlagRule))
        .register(|| Box::new(SuperfluousDisableCommandRule::default()))
        .build()
}

/// Appends the superfluous-disable meta rule.
pub fn with_meta(mut list: Vec<Box<dyn Rule>>) -> Vec<Box<dyn Rule>> {
    list.push(Box::new(SuperfluousDisableCommandRule::default()));
    list
}
