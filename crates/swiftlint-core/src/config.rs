//! Configuration types for swiftlint.
//!
//! A project is configured with a `.swiftlint.toml` file:
//!
//! ```toml
//! opt_in_rules = ["unused_declaration"]
//! disabled_rules = ["trailing_whitespace"]
//! excluded = ["Pods/**"]
//! warning_threshold = 20
//!
//! [rules.line_length]
//! warning = 100
//! error = 150
//! ignores_urls = true
//!
//! [rules]
//! force_cast = "warning"
//! function_body_length = [60, 120]
//! ```

use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::types::Severity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::warn;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Exclusive list of rules to run. Cannot be combined with
    /// `disabled_rules` or `opt_in_rules`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_rules: Option<Vec<String>>,

    /// Default rules to turn off.
    pub disabled_rules: Vec<String>,

    /// Opt-in rules to turn on.
    pub opt_in_rules: Vec<String>,

    /// Analyzer rules, which only run with compiler arguments.
    pub analyzer_rules: Vec<String>,

    /// Number of warnings that fails the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<usize>,

    /// Report every warning as an error.
    pub strict: bool,

    /// Report every error as a warning.
    pub lenient: bool,

    /// Paths to lint when none are given on the command line.
    pub included: Vec<PathBuf>,

    /// Glob patterns to skip.
    pub excluded: Vec<String>,

    /// Whether to honor `.gitignore` files (default: true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_gitignore: Option<bool>,

    /// Worker thread count; defaults to the number of CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,

    /// Default output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,

    /// Per-rule options keyed by rule identifier.
    pub rules: BTreeMap<String, toml::Value>,
}

/// How the enabled rule set is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesMode {
    /// Default rules, plus opt-ins, minus disabled rules.
    Default {
        /// Rules turned off.
        disabled: BTreeSet<String>,
        /// Opt-in rules turned on.
        opt_in: BTreeSet<String>,
    },
    /// Exactly these rules.
    Only(BTreeSet<String>),
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Whether `.gitignore` files are honored.
    #[must_use]
    pub fn respects_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }

    /// Returns the rule selection mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingRuleLists`] when `only_rules` is
    /// combined with `disabled_rules` or `opt_in_rules`.
    pub fn rules_mode(&self) -> Result<RulesMode, ConfigError> {
        match &self.only_rules {
            Some(_) if !self.disabled_rules.is_empty() || !self.opt_in_rules.is_empty() => {
                Err(ConfigError::ConflictingRuleLists)
            }
            Some(only) => Ok(RulesMode::Only(only.iter().cloned().collect())),
            None => Ok(RulesMode::Default {
                disabled: self.disabled_rules.iter().cloned().collect(),
                opt_in: self.opt_in_rules.iter().cloned().collect(),
            }),
        }
    }

    /// Instantiates and configures the enabled rules, sorted by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown identifiers, conflicting rule lists or
    /// malformed rule options.
    pub fn enabled_rules(&self, registry: &RuleRegistry) -> Result<Vec<Box<dyn Rule>>, ConfigError> {
        let mode = self.rules_mode()?;
        let listed = match &mode {
            RulesMode::Only(only) => only.iter().collect::<Vec<_>>(),
            RulesMode::Default { disabled, opt_in } => disabled.iter().chain(opt_in).collect(),
        };
        for id in listed
            .into_iter()
            .chain(&self.analyzer_rules)
            .chain(self.rules.keys())
        {
            if !registry.contains(id) {
                return Err(ConfigError::UnknownRule {
                    identifier: id.clone(),
                });
            }
        }

        let analyzer: BTreeSet<&str> = self.analyzer_rules.iter().map(String::as_str).collect();
        let mut rules = Vec::new();
        for id in registry.identifiers() {
            let rule = registry.create(id)?;
            let enabled = if rule.as_analyzer().is_some() {
                analyzer.contains(id)
            } else {
                match &mode {
                    RulesMode::Only(only) => only.contains(id),
                    RulesMode::Default { disabled, opt_in } => {
                        !disabled.contains(id) && (!rule.description().opt_in || opt_in.contains(id))
                    }
                }
            };
            if !enabled {
                if matches!(&mode, RulesMode::Only(only) if only.contains(id)) {
                    warn!("'{id}' is an analyzer rule; list it under analyzer_rules to run it");
                }
                continue;
            }
            let rule = match self.rules.get(id) {
                Some(value) => registry.create_configured(id, value)?,
                None => rule,
            };
            rules.push(rule);
        }
        Ok(rules)
    }

    /// Applies a nested directory's configuration on top of this one.
    ///
    /// Rule lists extend the parent's, per-rule options replace the parent's
    /// rule by rule, and scalars take the child's value when it sets one.
    #[must_use]
    pub fn merged(&self, child: &Config) -> Config {
        let mut merged = self.clone();
        match (&mut merged.only_rules, &child.only_rules) {
            (Some(parent), Some(child_only)) => extend_unique(parent, child_only),
            (None, Some(child_only)) => {
                merged.only_rules = Some(child_only.clone());
                merged.disabled_rules.clear();
                merged.opt_in_rules.clear();
            }
            _ => {}
        }
        if merged.only_rules.is_none() {
            extend_unique(&mut merged.disabled_rules, &child.disabled_rules);
            extend_unique(&mut merged.opt_in_rules, &child.opt_in_rules);
            merged
                .opt_in_rules
                .retain(|id| !child.disabled_rules.contains(id));
            merged
                .disabled_rules
                .retain(|id| !child.opt_in_rules.contains(id));
        }
        extend_unique(&mut merged.analyzer_rules, &child.analyzer_rules);
        extend_unique(&mut merged.excluded, &child.excluded);
        merged.included.extend(child.included.iter().cloned());
        merged
            .rules
            .extend(child.rules.iter().map(|(k, v)| (k.clone(), v.clone())));

        merged.warning_threshold = child.warning_threshold.or(merged.warning_threshold);
        merged.strict |= child.strict;
        merged.lenient |= child.lenient;
        merged.respect_gitignore = child.respect_gitignore.or(merged.respect_gitignore);
        merged.parallelism = child.parallelism.or(merged.parallelism);
        merged.reporter = child.reporter.clone().or(merged.reporter);
        merged
    }
}

fn extend_unique(target: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

/// A rule option that only sets the severity.
///
/// Accepted as `"warning"` or `{ severity = "warning" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityConfiguration {
    /// Severity of every violation the rule reports.
    pub severity: Severity,
}

impl SeverityConfiguration {
    /// Creates a configuration with the given severity.
    #[must_use]
    pub const fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

/// Warning and error thresholds for a measured quantity.
///
/// Accepted as `10`, `[10, 20]` or `{ warning = 10, error = 20 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevels")]
pub struct SeverityLevelsConfiguration {
    /// Values above this are warnings.
    pub warning: usize,
    /// Values above this are errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<usize>,
}

impl SeverityLevelsConfiguration {
    /// Creates thresholds.
    #[must_use]
    pub const fn new(warning: usize, error: Option<usize>) -> Self {
        Self { warning, error }
    }

    /// Creates thresholds, rejecting an error level below the warning level.
    ///
    /// # Errors
    ///
    /// Returns a message describing the inconsistent pair.
    pub fn try_new(warning: usize, error: Option<usize>) -> Result<Self, String> {
        if error.is_some_and(|error| error < warning) {
            return Err(format!("error threshold must not be below warning threshold {warning}"));
        }
        Ok(Self { warning, error })
    }

    /// Severity for a measured `value`, `None` if it is within limits.
    #[must_use]
    pub fn severity_for(&self, value: usize) -> Option<Severity> {
        match self.error {
            Some(error) if value > error => Some(Severity::Error),
            _ if value > self.warning => Some(Severity::Warning),
            _ => None,
        }
    }

    /// The threshold that was exceeded for `severity`.
    #[must_use]
    pub fn threshold_for(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error.unwrap_or(self.warning),
            Severity::Warning => self.warning,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevels {
    Warning(usize),
    List(Vec<usize>),
    Table {
        warning: usize,
        #[serde(default)]
        error: Option<usize>,
    },
}

impl TryFrom<RawLevels> for SeverityLevelsConfiguration {
    type Error = String;

    fn try_from(raw: RawLevels) -> Result<Self, Self::Error> {
        let (warning, error) = match raw {
            RawLevels::Warning(warning) => (warning, None),
            RawLevels::Table { warning, error } => (warning, error),
            RawLevels::List(list) => match list.as_slice() {
                [warning] => (*warning, None),
                [warning, error] => (*warning, Some(*error)),
                _ => return Err("expected one or two thresholds".to_string()),
            },
        };
        Self::try_new(warning, error)
    }
}

/// Deserializes a rule's options table.
///
/// A bare string is shorthand for `{ severity = ... }`, and a bare integer
/// or array is shorthand for `{ warning = ..., error = ... }`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] if the value does not fit `T`.
pub fn parse_rule_options<T: DeserializeOwned>(rule: &str, value: &toml::Value) -> Result<T, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidOption {
        rule: rule.to_string(),
        message,
    };
    let expanded = match value {
        toml::Value::String(severity) => {
            let mut table = toml::value::Table::new();
            table.insert("severity".to_string(), toml::Value::String(severity.clone()));
            toml::Value::Table(table)
        }
        toml::Value::Integer(_) | toml::Value::Array(_) => {
            let levels: SeverityLevelsConfiguration =
                value.clone().try_into().map_err(|e: toml::de::Error| invalid(e.to_string()))?;
            toml::Value::try_from(levels).map_err(|e| invalid(e.to_string()))?
        }
        other => other.clone(),
    };
    expanded
        .try_into()
        .map_err(|e: toml::de::Error| invalid(e.to_string()))
}

/// Serializes a rule's options for display and comparison.
#[must_use]
pub fn rule_options_value<T: Serialize>(options: &T) -> toml::Value {
    toml::Value::try_from(options).unwrap_or_else(|_| toml::Value::Table(toml::value::Table::new()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A rule list or option table names a rule that does not exist.
    #[error("'{identifier}' is not a valid rule identifier")]
    UnknownRule {
        /// The unrecognized identifier.
        identifier: String,
    },

    /// A rule rejected its options.
    #[error("Invalid configuration for '{rule}': {message}")]
    InvalidOption {
        /// Rule identifier.
        rule: String,
        /// What was wrong.
        message: String,
    },

    /// `only_rules` was combined with `disabled_rules` or `opt_in_rules`.
    #[error("'only_rules' cannot be combined with 'disabled_rules' or 'opt_in_rules'")]
    ConflictingRuleLists,
}
