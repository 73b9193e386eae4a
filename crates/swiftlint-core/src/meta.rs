//! Rules about the directive comments themselves.

use crate::config::{parse_rule_options, rule_options_value, ConfigError, SeverityConfiguration};
use crate::file::SwiftLintFile;
use crate::rule::{Rule, RuleDescription, RuleKind};
use crate::types::{Severity, Violation};

/// Identifier of [`SuperfluousDisableCommandRule`].
pub const SUPERFLUOUS_DISABLE_COMMAND: &str = "superfluous_disable_command";

static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: SUPERFLUOUS_DISABLE_COMMAND,
    name: "Superfluous Disable Command",
    description: "SwiftLint 'disable' commands are superfluous when the disabled rule would not have \
                  triggered a violation in the disabled region. Use \" - \" if you wish to document a command.",
    kind: RuleKind::Lint,
    opt_in: false,
    requires_tree: false,
};

/// Flags disable commands that suppressed nothing.
///
/// The check needs every other rule's raw violations, so the linter runs it
/// after all of them; [`Rule::validate`] reports nothing on its own.
#[derive(Debug, Clone)]
pub struct SuperfluousDisableCommandRule {
    configuration: SeverityConfiguration,
}

impl Default for SuperfluousDisableCommandRule {
    fn default() -> Self {
        Self {
            configuration: SeverityConfiguration::new(Severity::Warning),
        }
    }
}

impl SuperfluousDisableCommandRule {
    /// Reason for a disable command whose rule never fired in its region.
    #[must_use]
    pub fn superfluous_reason(rule_id: &str) -> String {
        format!(
            "SwiftLint rule '{rule_id}' did not trigger a violation in the disabled region; \
             remove the disable command"
        )
    }

    /// Reason for a disable command naming a rule that does not exist.
    #[must_use]
    pub fn invalid_identifier_reason(rule_id: &str) -> String {
        format!("'{rule_id}' is not a valid SwiftLint rule; remove it from the disable command")
    }

    /// Static metadata.
    #[must_use]
    pub fn static_description() -> &'static RuleDescription {
        &DESCRIPTION
    }
}

impl Rule for SuperfluousDisableCommandRule {
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
        self.configuration = parse_rule_options(self.identifier(), value)?;
        Ok(())
    }

    fn validate(&self, _file: &SwiftLintFile) -> Vec<Violation> {
        Vec::new()
    }

    fn box_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}
