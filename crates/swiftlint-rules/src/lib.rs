//! # swiftlint-rules
//!
//! Built-in lint rules for swiftlint.
//!
//! Each rule implements [`Rule`] from `swiftlint-core` plus whichever
//! capability traits it needs. [`registry`] collects them for the runner.
//!
//! ## Available Rules
//!
//! | Identifier | Kind | Opt-in | Notes |
//! |------------|------|--------|-------|
//! | `blanket_disable_command` | lint | no | disable commands must be re-enabled |
//! | `cyclomatic_complexity` | metrics | no | per-function branch count |
//! | `force_cast` | idiomatic | no | `as!` |
//! | `function_body_length` | metrics | no | code lines in a function body |
//! | `line_length` | metrics | no | characters per line |
//! | `nesting` | metrics | no | type and function depth |
//! | `reduce_boolean` | performance | no | correctable by rewrite |
//! | `trailing_whitespace` | style | no | correctable by substitution |
//! | `unused_declaration` | lint | yes | collects every file first |
//! | `unused_import` | lint | yes | analyzer, needs compiler arguments |
//! | `superfluous_disable_command` | lint | no | provided by `swiftlint-core` |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use swiftlint_core::Runner;
//! use swiftlint_syntax::SwiftParser;
//!
//! let runner = Runner::builder(swiftlint_rules::registry(), Arc::new(SwiftParser::new()))
//!     .path("Sources")
//!     .build()?;
//! let result = runner.lint()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blanket_disable_command;
mod cyclomatic_complexity;
mod force_cast;
mod function_body_length;
mod line_length;
mod nesting;
mod reduce_boolean;
mod registry;
mod support;
mod trailing_whitespace;
mod unused_declaration;
mod unused_import;

pub use blanket_disable_command::{BlanketDisableCommand, BlanketDisableCommandConfiguration};
pub use cyclomatic_complexity::{CyclomaticComplexity, CyclomaticComplexityConfiguration};
pub use force_cast::ForceCast;
pub use function_body_length::{FunctionBodyLength, FunctionBodyLengthConfiguration};
pub use line_length::{LineLength, LineLengthConfiguration};
pub use nesting::{Nesting, NestingConfiguration};
pub use reduce_boolean::ReduceBoolean;
pub use registry::registry;
pub use trailing_whitespace::{TrailingWhitespace, TrailingWhitespaceConfiguration};
pub use unused_declaration::{FileUsage, UnusedDeclaration, UnusedDeclarationConfiguration};
pub use unused_import::{UnusedImport, UnusedImportConfiguration};

/// Re-export core types for convenience.
pub use swiftlint_core::{Rule, Severity, Violation};
