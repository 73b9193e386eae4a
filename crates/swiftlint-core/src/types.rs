//! Core types for lint violations, corrections, and results.

use crate::location::{ByteRange, Location, Position};
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should be addressed; does not fail a run on its own.
    Warning,
    /// Must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A recorded text change made to eliminate a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Identifier of the rule that made the change.
    pub rule_id: String,
    /// Where the change starts.
    pub location: Location,
    /// Replaced byte span in the text the rule saw.
    pub range: ByteRange,
    /// Text written in place of `range`.
    pub replacement: String,
}

/// What a visitor emits before the harness attaches rule metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonedRuleViolation {
    /// Where the violation is reported.
    pub position: Position,
    /// Reason overriding the rule description.
    pub reason: Option<String>,
    /// Severity overriding the configured one.
    pub severity: Option<Severity>,
    /// Text substitution that would fix it.
    pub correction: Option<(ByteRange, String)>,
}

impl ReasonedRuleViolation {
    /// A violation at `position` with default reason and severity.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            reason: None,
            severity: None,
            correction: None,
        }
    }

    /// Overrides the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Attaches a substitution.
    #[must_use]
    pub fn with_correction(mut self, range: ByteRange, replacement: impl Into<String>) -> Self {
        self.correction = Some((range, replacement.into()));
        self
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identifier (e.g., "force_cast").
    pub rule_id: String,
    /// Human-readable rule name (e.g., "Force Cast").
    pub rule_name: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Byte position, when the rule reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Human-readable reason.
    pub reason: String,
    /// Substitution that would fix this violation, if the rule recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        severity: Severity,
        location: Location,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            severity,
            location,
            position: None,
            reason: reason.into(),
            correction: None,
        }
    }

    /// Records the byte position this violation was found at.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Embeds the substitution that fixes this violation.
    #[must_use]
    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = Some(correction);
        self
    }

    /// Replaces the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "{}: {}: {} Violation: {} ({})",
            self.location, self.severity, self.rule_name, self.reason, self.rule_id
        )
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {} ({})",
            self.location, self.severity, self.reason, self.rule_id
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl ViolationDiagnostic {
    /// Builds a diagnostic whose label spans `length` bytes from the violation.
    #[must_use]
    pub fn new(violation: &Violation, length: usize) -> Self {
        let offset = violation.position.map_or(0, Position::offset);
        Self {
            message: format!("[{}] {}", violation.severity, violation.reason),
            help: Some(format!(
                "silence with `// swiftlint:disable:next {}`",
                violation.rule_id
            )),
            span: SourceSpan::from((offset, length)),
            label_message: violation.rule_id.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Corrections applied, in correction mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<Correction>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Number of files the parser rejected.
    #[serde(default)]
    pub parse_failures: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Counts violations by severity as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        (errors, self.violations.len() - errors)
    }

    /// Orders violations by file, then location.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.cmp(&b.location))
                .then(a.rule_id.cmp(&b.rule_id))
        });
        self.corrections.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.cmp(&b.location))
        });
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.corrections.extend(other.corrections);
        self.files_checked += other.files_checked;
        self.parse_failures += other.parse_failures;
    }
}
