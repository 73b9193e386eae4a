//! Rules command implementation.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use swiftlint_core::{Config, Rule, RuleRegistry};
use swiftlint_rules::registry;

/// Runs the rules command.
pub fn run(enabled_only: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(Path::new("."), config_path)?;
    print!("{}", render(&registry(), &config, enabled_only)?);
    Ok(())
}

fn render(registry: &RuleRegistry, config: &Config, enabled_only: bool) -> Result<String> {
    let enabled: BTreeMap<&str, Box<dyn Rule>> = config
        .enabled_rules(registry)
        .context("Invalid configuration")?
        .into_iter()
        .map(|rule| (rule.identifier(), rule))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<29} {:<12} {:<7} {:<12} {:<9} {:<8} Configuration",
        "Identifier", "Kind", "Opt-in", "Correctable", "Analyzer", "Enabled"
    );
    out.push_str(&"-".repeat(100));
    out.push('\n');

    for rule in registry.rule_list() {
        let configured = enabled.get(rule.identifier());
        if enabled_only && configured.is_none() {
            continue;
        }
        let shown = configured.unwrap_or(&rule);
        let description = rule.description();
        let _ = writeln!(
            out,
            "{:<29} {:<12} {:<7} {:<12} {:<9} {:<8} {}",
            description.identifier,
            description.kind.to_string(),
            yes_no(description.opt_in),
            yes_no(rule.as_correctable().is_some()),
            yes_no(rule.as_analyzer().is_some()),
            yes_no(configured.is_some()),
            shown.configuration_value(),
        );
    }
    Ok(out)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(rendered: &'a str, identifier: &str) -> &'a str {
        rendered
            .lines()
            .find(|line| line.starts_with(&format!("{identifier} ")))
            .unwrap_or_else(|| panic!("no row for {identifier}:\n{rendered}"))
    }

    #[test]
    fn lists_every_rule_with_capabilities() {
        let rendered = render(&registry(), &Config::new(), false).unwrap();
        assert_eq!(rendered.lines().count(), 2 + registry().len());

        let reduce = row(&rendered, "reduce_boolean");
        assert!(reduce.contains("performance"), "{reduce}");
        assert_eq!(reduce.split_whitespace().nth(3), Some("yes"));

        let import = row(&rendered, "unused_import");
        let columns: Vec<_> = import.split_whitespace().collect();
        assert_eq!(&columns[2..6], &["yes", "no", "yes", "no"]);
    }

    #[test]
    fn enabled_filter_follows_the_configuration() {
        let config = Config::parse("only_rules = [\"force_cast\"]\n[rules]\nforce_cast = \"warning\"\n").unwrap();
        let rendered = render(&registry(), &config, true).unwrap();
        assert_eq!(rendered.lines().count(), 3);
        assert!(row(&rendered, "force_cast").contains("warning"));
    }
}
