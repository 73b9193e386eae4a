//! Inline `swiftlint:` directive commands.
//!
//! Supports directives like:
//! ```text
//! // swiftlint:disable force_cast
//! // swiftlint:disable:next line_length - generated URL below
//! let x = y as! Int // swiftlint:disable:this force_cast
//! // swiftlint:enable all
//! ```

use crate::location::{LocationConverter, Position};
use crate::syntax::Comment;
use std::collections::BTreeSet;

const DIRECTIVE_PREFIX: &str = "swiftlint:";

/// Text after this delimiter documents the command and is not a rule id.
const COMMENT_DELIMITER: &str = " - ";

/// A rule scope named by a directive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleIdentifier {
    /// The `all` keyword.
    All,
    /// A single rule identifier.
    Single(String),
}

impl RuleIdentifier {
    /// Parses a directive token; `all` maps to [`RuleIdentifier::All`].
    #[must_use]
    pub fn new(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Single(value.to_string())
        }
    }

    /// Text form, as written in source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Single(id) => id,
        }
    }
}

impl std::fmt::Display for RuleIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verb of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Rules are enabled from this point.
    Enable,
    /// Rules are disabled from this point.
    Disable,
    /// Unrecognized verb.
    Invalid,
}

impl Action {
    /// The action that cancels this one.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Enable => Self::Disable,
            Self::Disable => Self::Enable,
            Self::Invalid => Self::Invalid,
        }
    }
}

/// Narrows a command to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// The line before the command.
    Previous,
    /// The command's own line.
    This,
    /// The line after the command.
    Next,
    /// Unrecognized modifier.
    Invalid,
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Enable or disable.
    pub action: Action,
    /// Rules the command applies to.
    pub rule_identifiers: BTreeSet<RuleIdentifier>,
    /// Line of the command (1-indexed).
    pub line: usize,
    /// Column just past the end of the directive; `None` means the start of the line.
    pub character: Option<usize>,
    /// Single-line modifier, if any.
    pub modifier: Option<Modifier>,
    /// Free text after ` - `.
    pub trailing_comment: Option<String>,
}

impl Command {
    /// Creates a command from explicit parts.
    #[must_use]
    pub fn new(
        action: Action,
        rule_identifiers: BTreeSet<RuleIdentifier>,
        line: usize,
        character: Option<usize>,
    ) -> Self {
        Self {
            action,
            rule_identifiers,
            line,
            character,
            modifier: None,
            trailing_comment: None,
        }
    }

    /// Parses directive text beginning with `swiftlint:`.
    #[must_use]
    pub fn parse(action_string: &str, line: usize, character: usize) -> Self {
        let body = action_string
            .strip_prefix(DIRECTIVE_PREFIX)
            .unwrap_or(action_string);
        let (verb, rest) = body.split_once(' ').unwrap_or((body, ""));

        let (action_text, modifier_text) = match verb.split_once(':') {
            Some((action, modifier)) => (action, Some(modifier)),
            None => (verb, None),
        };
        let action = match action_text {
            "enable" => Action::Enable,
            "disable" => Action::Disable,
            _ => Action::Invalid,
        };
        let modifier = modifier_text.map(|m| match m {
            "previous" => Modifier::Previous,
            "this" => Modifier::This,
            "next" => Modifier::Next,
            _ => Modifier::Invalid,
        });

        let (rule_text, trailing_comment) = match rest.split_once(COMMENT_DELIMITER) {
            Some((rules, comment)) => (rules, Some(comment.to_string())),
            None => (rest, None),
        };
        let rule_identifiers = rule_text
            .split_whitespace()
            .filter(|token| *token != "*/")
            .map(RuleIdentifier::new)
            .collect();

        Self {
            action,
            rule_identifiers,
            line,
            character: Some(character),
            modifier,
            trailing_comment,
        }
    }

    /// Returns true for well-formed commands naming at least one rule.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.action != Action::Invalid
            && self.modifier != Some(Modifier::Invalid)
            && !self.rule_identifiers.is_empty()
    }

    /// Expands a modified command into a plain pair bracketing one line.
    ///
    /// Commands without a modifier are returned as-is.
    #[must_use]
    pub fn expand(&self) -> Vec<Command> {
        let target_line = match self.modifier {
            None => return vec![self.clone()],
            Some(Modifier::Invalid) => return Vec::new(),
            Some(Modifier::Previous) => self.line.saturating_sub(1),
            Some(Modifier::This) => self.line,
            Some(Modifier::Next) => self.line + 1,
        };
        vec![
            Command::new(self.action, self.rule_identifiers.clone(), target_line, None),
            Command::new(
                self.action.inverse(),
                self.rule_identifiers.clone(),
                target_line,
                Some(usize::MAX),
            ),
        ]
    }
}

/// Finds directives in comment trivia, in source order and unexpanded.
///
/// A directive runs from `swiftlint:` to the end of its line within the
/// comment and must carry a space-separated argument list.
#[must_use]
pub fn commands_in(comments: &[Comment], converter: &LocationConverter) -> Vec<Command> {
    let mut commands = Vec::new();
    for comment in comments {
        let mut search_from = 0;
        while let Some(found) = comment.text[search_from..].find(DIRECTIVE_PREFIX) {
            let start = search_from + found;
            let line_end = comment.text[start..]
                .find('\n')
                .map_or(comment.text.len(), |n| start + n);
            let directive = comment.text[start..line_end].trim_end_matches('\r');
            search_from = line_end;

            if !looks_like_directive(directive) {
                continue;
            }
            let end = Position(comment.span.start + start + directive.len());
            let (line, character) = converter.location(end);
            commands.push(Command::parse(directive, line, character));
        }
    }
    commands
}

fn looks_like_directive(directive: &str) -> bool {
    let body = &directive[DIRECTIVE_PREFIX.len()..];
    let starts_with_verb = body.starts_with("enable") || body.starts_with("disable");
    let has_arguments = body
        .split_once(' ')
        .is_some_and(|(_, rest)| !rest.trim().is_empty());
    starts_with_verb && has_arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::scan_comments;

    fn ids(values: &[&str]) -> BTreeSet<RuleIdentifier> {
        values.iter().map(|v| RuleIdentifier::new(v)).collect()
    }

    #[test]
    fn parses_disable_with_multiple_rules() {
        let command = Command::parse("swiftlint:disable force_cast nesting", 3, 40);
        assert_eq!(command.action, Action::Disable);
        assert_eq!(command.rule_identifiers, ids(&["force_cast", "nesting"]));
        assert_eq!(command.modifier, None);
        assert_eq!(command.character, Some(40));
        assert!(command.is_valid());
    }

    #[test]
    fn parses_modifier_and_trailing_comment() {
        let command = Command::parse("swiftlint:disable:next force_try - Explanation here", 1, 1);
        assert_eq!(command.modifier, Some(Modifier::Next));
        assert_eq!(command.rule_identifiers, ids(&["force_try"]));
        assert_eq!(command.trailing_comment.as_deref(), Some("Explanation here"));
    }

    #[test]
    fn ignores_block_comment_terminator() {
        let command = Command::parse("swiftlint:enable all */", 1, 1);
        assert_eq!(command.action, Action::Enable);
        assert_eq!(command.rule_identifiers, ids(&["all"]));
        assert!(command.rule_identifiers.contains(&RuleIdentifier::All));
    }

    #[test]
    fn invalid_verbs_and_modifiers_are_flagged() {
        assert_eq!(Command::parse("swiftlint:toggle foo", 1, 1).action, Action::Invalid);
        let command = Command::parse("swiftlint:disable:later foo", 1, 1);
        assert_eq!(command.modifier, Some(Modifier::Invalid));
        assert!(!command.is_valid());
        assert!(command.expand().is_empty());
    }

    #[test]
    fn expands_next_into_one_line_pair() {
        let command = Command::parse("swiftlint:disable:next force_cast", 4, 30);
        let expanded = command.expand();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].action, Action::Disable);
        assert_eq!((expanded[0].line, expanded[0].character), (5, None));
        assert_eq!(expanded[1].action, Action::Enable);
        assert_eq!((expanded[1].line, expanded[1].character), (5, Some(usize::MAX)));
    }

    #[test]
    fn expands_previous_and_this() {
        let previous = Command::parse("swiftlint:enable:previous a", 4, 30).expand();
        assert_eq!(previous[0].line, 3);
        assert_eq!(previous[0].action, Action::Enable);
        assert_eq!(previous[1].action, Action::Disable);
        let this = Command::parse("swiftlint:disable:this a", 4, 30).expand();
        assert_eq!(this[0].line, 4);
    }

    #[test]
    fn finds_directives_only_in_comments() {
        let text = "let s = \"swiftlint:disable foo\"\n// swiftlint:disable force_cast\nlet x = 1\n";
        let converter = LocationConverter::new(text);
        let commands = commands_in(&scan_comments(text), &converter);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].line, 2);
        assert_eq!(commands[0].character, Some(32));
    }

    #[test]
    fn directive_without_rules_is_not_a_command() {
        let text = "// swiftlint:disable\n";
        let converter = LocationConverter::new(text);
        assert!(commands_in(&scan_comments(text), &converter).is_empty());
    }

    #[test]
    fn block_comment_lines_are_separate_directives() {
        let text = "/*\n swiftlint:disable a\n swiftlint:enable a\n*/\n";
        let converter = LocationConverter::new(text);
        let commands = commands_in(&scan_comments(text), &converter);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].line, 2);
        assert_eq!(commands[1].line, 3);
        assert_eq!(commands[1].action, Action::Enable);
    }
}
