//! Suppression regions derived from directive commands.

use crate::command::{Action, Command, RuleIdentifier};
use crate::location::Location;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A span of a file with the set of rules disabled inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// First location covered (inclusive).
    pub start: Location,
    /// Last location covered (inclusive).
    pub end: Location,
    /// Rules disabled throughout the span.
    pub disabled: BTreeSet<RuleIdentifier>,
}

impl Region {
    /// Returns true if `location` lies within the region.
    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.start <= *location && *location <= self.end
    }

    /// Returns true if `rule_id` runs inside this region.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        !self.is_rule_disabled(rule_id)
    }

    /// Returns true if `rule_id` (or `all`) is disabled here.
    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled.contains(&RuleIdentifier::All)
            || self
                .disabled
                .contains(&RuleIdentifier::Single(rule_id.to_string()))
    }

    /// Returns true if `all` is disabled here.
    #[must_use]
    pub fn disables_all(&self) -> bool {
        self.disabled.contains(&RuleIdentifier::All)
    }

    /// Identifiers disabled here, `all` included.
    pub fn disabled_rule_identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.disabled.iter().map(RuleIdentifier::as_str)
    }
}

/// Builds regions from expanded commands in source order.
///
/// Each command opens a region that runs until just before the next command.
/// Disable commands add their rules to the running set and enable commands
/// remove them, so repeated disables toggle rather than stack. When
/// `restricting` is given, only commands mentioning one of those identifiers
/// take part.
#[must_use]
pub fn regions(
    file: Option<&PathBuf>,
    commands: &[Command],
    restricting: Option<&BTreeSet<RuleIdentifier>>,
) -> Vec<Region> {
    let commands: Vec<&Command> = match restricting {
        Some(ids) => commands
            .iter()
            .filter(|c| c.rule_identifiers.iter().any(|id| ids.contains(id)))
            .collect(),
        None => commands.iter().collect(),
    };

    let mut result: Vec<Region> = Vec::new();
    let mut disabled: BTreeSet<RuleIdentifier> = BTreeSet::new();

    for (index, command) in commands.iter().enumerate() {
        match command.action {
            Action::Disable => disabled.extend(command.rule_identifiers.iter().cloned()),
            Action::Enable => {
                for id in &command.rule_identifiers {
                    disabled.remove(id);
                }
            }
            Action::Invalid => {}
        }

        let start = Location::new(file.cloned(), command.line, command.character);
        let end = end_of(file, commands.get(index + 1).copied());
        if start >= end {
            continue;
        }

        if let Some(existing) = result
            .iter_mut()
            .find(|r| r.start == start && r.end == end)
        {
            existing.disabled.extend(disabled.iter().cloned());
        } else {
            result.push(Region {
                start,
                end,
                disabled: disabled.clone(),
            });
        }
    }
    result
}

fn end_of(file: Option<&PathBuf>, next: Option<&Command>) -> Location {
    let Some(next) = next else {
        return Location::new(file.cloned(), usize::MAX, Some(usize::MAX));
    };
    match next.character {
        Some(character) => {
            let character = (character > 0).then(|| character - 1);
            Location::new(file.cloned(), next.line, character)
        }
        None => Location::new(
            file.cloned(),
            next.line.saturating_sub(1),
            Some(usize::MAX),
        ),
    }
}
