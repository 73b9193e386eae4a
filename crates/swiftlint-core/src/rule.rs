//! Rule traits and capabilities.
//!
//! Every rule implements [`Rule`]. Extra capabilities are separate traits a
//! rule opts into and advertises through the `as_*` accessors, so the linter
//! asks "can this rule correct?" instead of walking a class hierarchy:
//!
//! - [`CorrectableRule`]: can rewrite the file to remove its violations
//! - [`CollectingRule`]: needs info from every file before judging one
//! - [`AnalyzerRule`]: needs compiler arguments

use crate::config::ConfigError;
use crate::correction::{SubstitutionCorrectableRule, SyntaxRewriteRule};
use crate::file::SwiftLintFile;
use crate::location::Position;
use crate::storage::{CollectedInfo, RuleStorage};
use crate::types::{Severity, Violation};
use serde::Serialize;

/// Broad category of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Likely bugs.
    Lint,
    /// Non-idiomatic code.
    Idiomatic,
    /// Formatting.
    Style,
    /// Size and complexity limits.
    Metrics,
    /// Slow constructs.
    Performance,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Lint => "lint",
            Self::Idiomatic => "idiomatic",
            Self::Style => "style",
            Self::Metrics => "metrics",
            Self::Performance => "performance",
        };
        f.write_str(text)
    }
}

/// Static metadata shared by every instance of a rule type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescription {
    /// Snake-case identifier used in config and directives (e.g. "force_cast").
    pub identifier: &'static str,
    /// Human-readable name (e.g. "Force Cast").
    pub name: &'static str,
    /// What the rule checks; also the default violation reason.
    pub description: &'static str,
    /// Category.
    pub kind: RuleKind,
    /// Whether the rule must be enabled explicitly.
    pub opt_in: bool,
    /// Whether the rule needs a syntax tree. Such rules are skipped on
    /// files that fail to parse.
    pub requires_tree: bool,
}

impl RuleDescription {
    /// Builds a violation of this rule at a byte position.
    #[must_use]
    pub fn violation_at(
        &'static self,
        file: &SwiftLintFile,
        severity: Severity,
        position: Position,
        reason: impl Into<String>,
    ) -> Violation {
        Violation::new(
            self.identifier,
            self.name,
            severity,
            file.location(position),
            reason,
        )
        .with_position(position)
    }

    /// Builds a violation of this rule at a line and optional column.
    #[must_use]
    pub fn violation_on_line(
        &'static self,
        file: &SwiftLintFile,
        severity: Severity,
        line: usize,
        character: Option<usize>,
        reason: impl Into<String>,
    ) -> Violation {
        let mut violation = Violation::new(
            self.identifier,
            self.name,
            severity,
            file.location_at(line, character),
            reason,
        );
        if let Some(position) = character.and_then(|c| file.converter().position(line, c)) {
            violation = violation.with_position(position);
        }
        violation
    }
}

/// A configured lint rule.
///
/// # Example
///
/// ```
/// use swiftlint_core::{
///     ConfigError, Rule, RuleDescription, RuleKind, Severity, SwiftLintFile, Violation,
/// };
///
/// static DESCRIPTION: RuleDescription = RuleDescription {
///     identifier: "no_tabs",
///     name: "No Tabs",
///     description: "Indent with spaces",
///     kind: RuleKind::Style,
///     opt_in: true,
///     requires_tree: false,
/// };
///
/// #[derive(Clone)]
/// struct NoTabs;
///
/// impl Rule for NoTabs {
///     fn description(&self) -> &'static RuleDescription { &DESCRIPTION }
///     fn severity(&self) -> Severity { Severity::Warning }
///     fn configuration_value(&self) -> toml::Value { toml::Value::Table(Default::default()) }
///     fn apply_configuration(&mut self, _: &toml::Value) -> Result<(), ConfigError> { Ok(()) }
///     fn box_clone(&self) -> Box<dyn Rule> { Box::new(self.clone()) }
///
///     fn validate(&self, file: &SwiftLintFile) -> Vec<Violation> {
///         file.lines()
///             .filter(|line| line.content.starts_with('\t'))
///             .map(|line| DESCRIPTION.violation_on_line(file, self.severity(), line.index, Some(1), DESCRIPTION.description))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Static metadata for this rule type.
    fn description(&self) -> &'static RuleDescription;

    /// Snake-case identifier.
    fn identifier(&self) -> &'static str {
        self.description().identifier
    }

    /// Default severity of this instance's violations.
    fn severity(&self) -> Severity;

    /// Current options, used for display and equality.
    fn configuration_value(&self) -> toml::Value;

    /// Replaces the options from a config value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is malformed.
    fn apply_configuration(&mut self, value: &toml::Value) -> Result<(), ConfigError>;

    /// Checks one file. Must not modify it.
    fn validate(&self, file: &SwiftLintFile) -> Vec<Violation>;

    /// Clones into a new box.
    fn box_clone(&self) -> Box<dyn Rule>;

    /// The correction capability, if any.
    fn as_correctable(&self) -> Option<&dyn CorrectableRule> {
        None
    }

    /// The two-phase collection capability, if any.
    fn as_collecting(&self) -> Option<&dyn AnyCollectingRule> {
        None
    }

    /// The compiler-argument capability, if any.
    fn as_analyzer(&self) -> Option<&dyn AnalyzerRule> {
        None
    }
}

impl Clone for Box<dyn Rule> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("identifier", &self.identifier())
            .field("configuration", &self.configuration_value())
            .finish()
    }
}

/// Two configured rules are equal when they share an identifier and options.
#[must_use]
pub fn rules_equal(a: &dyn Rule, b: &dyn Rule) -> bool {
    a.identifier() == b.identifier() && a.configuration_value() == b.configuration_value()
}

/// How a correctable rule fixes a file. A rule uses exactly one.
pub enum CorrectionStrategy<'a> {
    /// Replace whole syntax nodes.
    Rewrite(&'a dyn SyntaxRewriteRule),
    /// Substitute text ranges.
    Substitution(&'a dyn SubstitutionCorrectableRule),
}

/// A rule that can rewrite a file to remove its violations.
pub trait CorrectableRule: Rule {
    /// The strategy the correction harness should drive.
    fn correction_strategy(&self) -> CorrectionStrategy<'_>;
}

/// A rule that judges each file against info gathered from every file.
///
/// Implementations should make their single-file [`Rule::validate`] call
/// [`collecting_rule_misuse`].
pub trait CollectingRule: Rule {
    /// Per-file info gathered in phase 1.
    type FileInfo: Send + Sync + 'static;

    /// Phase 1: extracts this file's contribution.
    fn collect_info(&self, file: &SwiftLintFile) -> Self::FileInfo;

    /// Phase 2: validates one file against every file's info.
    fn validate_collected(
        &self,
        file: &SwiftLintFile,
        collected: &CollectedInfo<Self::FileInfo>,
    ) -> Vec<Violation>;
}

/// Object-safe view of a [`CollectingRule`], blanket-implemented.
pub trait AnyCollectingRule: Send + Sync {
    /// Runs phase 1 for `file` and stores the result.
    fn collect_into(&self, file: &SwiftLintFile, storage: &RuleStorage);

    /// Runs phase 2 for `file`.
    ///
    /// # Panics
    ///
    /// Panics if `storage` has not been sealed.
    fn validate_from(&self, file: &SwiftLintFile, storage: &RuleStorage) -> Vec<Violation>;
}

impl<R: CollectingRule> AnyCollectingRule for R {
    fn collect_into(&self, file: &SwiftLintFile, storage: &RuleStorage) {
        storage.collect(self.identifier(), file.id().clone(), self.collect_info(file));
    }

    fn validate_from(&self, file: &SwiftLintFile, storage: &RuleStorage) -> Vec<Violation> {
        let collected = storage.collected::<R::FileInfo>(self.identifier());
        self.validate_collected(file, &collected)
    }
}

/// A rule that needs the compiler invocation for the file.
pub trait AnalyzerRule: Rule {
    /// Checks one file with the given compiler arguments.
    fn validate_with_arguments(
        &self,
        file: &SwiftLintFile,
        compiler_arguments: &[String],
    ) -> Vec<Violation>;
}

/// Fails fast when a collecting rule is asked for a single-file check.
///
/// # Panics
///
/// Always.
#[track_caller]
pub fn collecting_rule_misuse(identifier: &str) -> ! {
    panic!("'{identifier}' is a collecting rule and must be validated with collected info")
}
