//! # swiftlint-syntax
//!
//! Tree-sitter based Swift parser for `swiftlint-core`.
//!
//! [`SwiftParser`] implements [`swiftlint_core::SourceParser`] by parsing
//! with the `tree-sitter-swift` grammar and copying the concrete syntax tree
//! into the engine's owned [`swiftlint_core::SyntaxTree`]. Node kinds are
//! the grammar's, e.g. `class_declaration`, `function_body`, `comment`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod swift;

pub use swift::SwiftParser;
