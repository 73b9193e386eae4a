//! Per-file orchestration of rules.

use crate::command::RuleIdentifier;
use crate::correction::correct;
use crate::file::SwiftLintFile;
use crate::meta::{SuperfluousDisableCommandRule, SUPERFLUOUS_DISABLE_COMMAND};
use crate::region::Region;
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::storage::RuleStorage;
use crate::types::{Correction, Severity, Violation};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared, immutable rule list.
pub type RuleSet = Arc<Vec<Box<dyn Rule>>>;

/// Runs a rule set over one file.
///
/// Analyzer rules run only when compiler arguments are given, and every
/// other rule runs only when they are not.
pub struct Linter<'a> {
    file: SwiftLintFile,
    rules: RuleSet,
    analyze: bool,
    registry: &'a RuleRegistry,
    compiler_arguments: &'a [String],
}

impl<'a> Linter<'a> {
    /// Creates a linter for lint mode.
    #[must_use]
    pub fn new(file: SwiftLintFile, rules: impl Into<RuleSet>, registry: &'a RuleRegistry) -> Self {
        Self::with_compiler_arguments(file, rules, registry, &[])
    }

    /// Creates a linter; non-empty `compiler_arguments` select analyzer rules.
    #[must_use]
    pub fn with_compiler_arguments(
        file: SwiftLintFile,
        rules: impl Into<RuleSet>,
        registry: &'a RuleRegistry,
        compiler_arguments: &'a [String],
    ) -> Self {
        Self {
            file,
            rules: rules.into(),
            analyze: !compiler_arguments.is_empty(),
            registry,
            compiler_arguments,
        }
    }

    /// The file being linted.
    #[must_use]
    pub fn file(&self) -> &SwiftLintFile {
        &self.file
    }

    /// Rules selected for this mode, in configuration order.
    pub fn rules(&self) -> impl Iterator<Item = &(dyn Rule + 'static)> + '_ {
        selected(&self.rules, self.analyze)
    }

    /// Returns true if any selected rule needs the collection phase.
    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.rules().any(|rule| rule.as_collecting().is_some())
    }

    /// Runs phase 1 for every collecting rule.
    #[must_use]
    pub fn collect(self, storage: &RuleStorage) -> CollectedLinter<'a> {
        if !self.file.is_empty() {
            for collecting in self.rules().filter_map(|rule| rule.as_collecting()) {
                collecting.collect_into(&self.file, storage);
            }
        }
        CollectedLinter { linter: self }
    }
}

fn selected(
    rules: &[Box<dyn Rule>],
    analyze: bool,
) -> impl Iterator<Item = &(dyn Rule + 'static)> + '_ {
    rules
        .iter()
        .map(AsRef::as_ref)
        .filter(move |rule| rule.as_analyzer().is_some() == analyze)
}

/// A linter whose file has been through the collection phase.
pub struct CollectedLinter<'a> {
    linter: Linter<'a>,
}

impl CollectedLinter<'_> {
    /// The file being linted.
    #[must_use]
    pub fn file(&self) -> &SwiftLintFile {
        &self.linter.file
    }

    /// Gives the file and its rule set back.
    #[must_use]
    pub fn into_parts(self) -> (SwiftLintFile, RuleSet) {
        (self.linter.file, self.linter.rules)
    }

    /// Every violation in the file, sorted by location.
    ///
    /// # Panics
    ///
    /// Panics if a collecting rule is selected and `storage` is not sealed.
    #[must_use]
    pub fn style_violations(&self, storage: &RuleStorage) -> Vec<Violation> {
        let file = &self.linter.file;
        if file.is_empty() {
            return Vec::new();
        }

        let superfluous_severity = self
            .linter
            .rules()
            .find(|rule| rule.identifier() == SUPERFLUOUS_DISABLE_COMMAND)
            .map(|rule| rule.severity());
        let parse_failed = file.parse_error().is_some();
        let has_shebang = file.contents().starts_with("#!");
        let regions = file.regions();

        let mut violations = Vec::new();
        for rule in self.linter.rules() {
            if parse_failed && rule.description().requires_tree {
                debug!("{}: skipping '{}', file did not parse", file.display_name(), rule.identifier());
                continue;
            }
            let raw = self.validate_rule(rule, storage);
            violations.extend(
                raw.iter()
                    .filter(|v| {
                        regions
                            .iter()
                            .find(|r| r.contains(&v.location))
                            .map_or(true, |r| r.is_rule_enabled(rule.identifier()))
                    })
                    .filter(|v| !(has_shebang && v.location.line == 1))
                    .cloned(),
            );
            if let Some(severity) = superfluous_severity {
                violations.extend(self.superfluous_violations(rule.identifier(), &raw, severity));
            }
        }
        if let Some(severity) = superfluous_severity {
            violations.extend(self.invalid_identifier_violations(severity));
        }

        violations.sort_by(|a, b| a.location.cmp(&b.location));
        violations
    }

    /// Applies every correctable rule in turn, writing once per rule that
    /// changed the text. Files that fail to parse, or whose tree contains
    /// error nodes, are left alone.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing the file fails.
    pub fn correct(&mut self, _storage: &RuleStorage) -> std::io::Result<Vec<Correction>> {
        let problem = match self.linter.file.syntax_tree() {
            Err(error) => Some(error.to_string()),
            Ok(tree) if tree.has_errors() => Some("the syntax tree has error nodes".to_string()),
            Ok(_) => None,
        };
        if let Some(problem) = problem {
            warn!(
                "Skipping correcting file because it produced parser errors: {} ({problem})",
                self.linter.file.display_name()
            );
            return Ok(Vec::new());
        }

        let mut corrections = Vec::new();
        let rules = Arc::clone(&self.linter.rules);
        for rule in selected(&rules, self.linter.analyze) {
            if rule.as_correctable().is_none() {
                continue;
            }
            let outcome = correct(rule, &self.linter.file);
            if let Some(contents) = outcome.contents {
                self.linter.file.write(contents)?;
                debug!(
                    "{}: '{}' applied {} correction(s)",
                    self.linter.file.display_name(),
                    rule.identifier(),
                    outcome.corrections.len()
                );
            }
            corrections.extend(outcome.corrections);
        }
        Ok(corrections)
    }

    fn validate_rule(&self, rule: &dyn Rule, storage: &RuleStorage) -> Vec<Violation> {
        let file = &self.linter.file;
        if let Some(analyzer) = rule.as_analyzer() {
            analyzer.validate_with_arguments(file, self.linter.compiler_arguments)
        } else if let Some(collecting) = rule.as_collecting() {
            collecting.validate_from(file, storage)
        } else {
            rule.validate(file)
        }
    }

    fn superfluous_violations(&self, rule_id: &str, raw: &[Violation], severity: Severity) -> Vec<Violation> {
        let file = &self.linter.file;
        let all_regions = file.regions();
        let regions: Vec<Region> = if all_regions.len() > 1 {
            let restricting: BTreeSet<RuleIdentifier> = [
                RuleIdentifier::new(rule_id),
                RuleIdentifier::new(SUPERFLUOUS_DISABLE_COMMAND),
                RuleIdentifier::All,
            ]
            .into_iter()
            .collect();
            file.regions_restricted_to(&restricting)
        } else {
            all_regions.to_vec()
        };

        let target = RuleIdentifier::new(rule_id);
        let meta_disabled: Vec<&Region> = regions
            .iter()
            .filter(|r| r.is_rule_disabled(SUPERFLUOUS_DISABLE_COMMAND))
            .collect();
        regions
            .iter()
            .filter(|region| region.disabled.contains(&target))
            .filter(|region| !meta_disabled.iter().any(|m| m.contains(&region.start)))
            .filter(|region| !raw.iter().any(|v| region.contains(&v.location)))
            .map(|region| {
                meta_violation(
                    severity,
                    region,
                    SuperfluousDisableCommandRule::superfluous_reason(rule_id),
                )
            })
            .collect()
    }

    /// Unknown identifiers, reported where each first becomes disabled.
    fn invalid_identifier_violations(&self, severity: Severity) -> Vec<Violation> {
        let registry = self.linter.registry;
        let mut previous: BTreeSet<RuleIdentifier> = BTreeSet::new();
        let mut violations = Vec::new();
        for region in self.linter.file.regions() {
            for id in region.disabled.difference(&previous) {
                if let RuleIdentifier::Single(id) = id {
                    if !registry.contains(id) {
                        violations.push(meta_violation(
                            severity,
                            region,
                            SuperfluousDisableCommandRule::invalid_identifier_reason(id),
                        ));
                    }
                }
            }
            previous.clone_from(&region.disabled);
        }
        violations
    }
}

fn meta_violation(severity: Severity, region: &Region, reason: String) -> Violation {
    let description = SuperfluousDisableCommandRule::static_description();
    Violation::new(
        description.identifier,
        description.name,
        severity,
        region.start.clone(),
        reason,
    )
}
