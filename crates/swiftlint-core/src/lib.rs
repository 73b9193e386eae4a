//! # swiftlint-core
//!
//! Core engine for linting Swift sources.
//!
//! This crate owns everything between a parsed file and a list of
//! violations:
//!
//! - [`SwiftLintFile`] with lazily computed lines, tree, comments and regions
//! - [`Command`] and [`Region`] for `swiftlint:disable` directives
//! - [`Rule`] and its capability traits ([`CorrectableRule`],
//!   [`CollectingRule`], [`AnalyzerRule`])
//! - [`walk`] and [`correct`], the traversal and correction harnesses
//! - [`RuleStorage`] for rules that need every file before judging one
//! - [`Linter`] for one file and [`Runner`] for many
//!
//! Parsing is delegated to a [`SourceParser`]; rules come from a
//! [`RuleRegistry`].
//!
//! ## Example
//!
//! ```ignore
//! use swiftlint_core::{Config, Runner};
//!
//! let runner = Runner::builder(registry, parser)
//!     .path("Sources")
//!     .config(Config::from_file(".swiftlint.toml".as_ref())?)
//!     .build()?;
//!
//! let result = runner.lint()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod correction;
mod file;
mod linter;
mod location;
mod meta;
mod region;
mod registry;
mod rule;
mod runner;
mod storage;
mod syntax;
mod types;
mod visitor;

pub use command::{commands_in, Action, Command, Modifier, RuleIdentifier};
pub use config::{
    parse_rule_options, rule_options_value, Config, ConfigError, RulesMode, SeverityConfiguration,
    SeverityLevelsConfiguration,
};
pub use correction::{correct, CorrectionOutcome, SubstitutionCorrectableRule, SyntaxRewriteRule};
pub use file::{Line, SwiftLintFile};
pub use linter::{CollectedLinter, Linter, RuleSet};
pub use location::{ByteRange, Location, LocationConverter, Position};
pub use meta::{SuperfluousDisableCommandRule, SUPERFLUOUS_DISABLE_COMMAND};
pub use region::{regions, Region};
pub use registry::{RuleFactory, RuleRegistry, RuleRegistryBuilder};
pub use rule::{
    collecting_rule_misuse, rules_equal, AnalyzerRule, AnyCollectingRule, CollectingRule,
    CorrectableRule, CorrectionStrategy, Rule, RuleDescription, RuleKind,
};
pub use runner::{
    Runner, RunnerBuilder, RunnerError, SeverityPolicy, CONFIG_FILE_NAME, PARSE_ERROR_RULE,
    WARNING_THRESHOLD_RULE,
};
pub use storage::{CollectedInfo, FileId, RuleStorage};
pub use syntax::{
    scan_comments, Comment, CommentKind, Node, ParseError, SourceParser, SyntaxTree,
    SyntaxTreeBuilder, BLOCK_COMMENT_KIND, ERROR_KIND, LINE_COMMENT_KIND,
};
pub use types::{Correction, LintResult, ReasonedRuleViolation, Severity, Violation, ViolationDiagnostic};
pub use visitor::{validate_syntax_rule, walk, SyntaxRule, SyntaxVisitor, ViolationSink, VisitAction};
