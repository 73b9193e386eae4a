//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;
use swiftlint_core::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = r#"# swiftlint configuration
# Nested .swiftlint.toml files apply to their directory and below.

# Paths to lint when none are given on the command line
# included = ["Sources", "Tests"]

# Glob patterns to skip
excluded = [
    "**/.build/**",
    "**/Pods/**",
    "**/Carthage/**",
]

# Respect .gitignore files
respect_gitignore = true

# Rule selection. `only_rules` cannot be combined with the other two lists.
# only_rules = ["force_cast", "line_length"]
disabled_rules = []
opt_in_rules = [
    # "unused_declaration",
]

# Run by `swiftlint analyze` only
analyzer_rules = [
    # "unused_import",
]

# Fail the run once this many warnings are reported
# warning_threshold = 50

# Report every warning as an error / every error as a warning
strict = false
lenient = false

# text, json, compact or pretty
# reporter = "text"

# Per-rule options. Metrics accept `[warning, error]`, `warning` alone,
# or a table; other rules accept a severity string or a table.
[rules]
line_length = [120, 200]
function_body_length = [50, 100]
# force_cast = "warning"

[rules.trailing_whitespace]
ignores_empty_lines = false
ignores_comments = true

# [rules.nesting]
# type_level = [1, 2]
# function_level = [2, 3]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_default(Path::new("."), force)?;

    println!("Created {CONFIG_FILE_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: swiftlint lint");

    Ok(())
}

fn write_default(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::debug!("Wrote {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlint_core::Config;
    use swiftlint_rules::registry;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let rules = config.enabled_rules(&registry()).unwrap();
        assert!(rules.iter().any(|rule| rule.identifier() == "line_length"));
        assert!(config.respects_gitignore());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "strict = true\n").unwrap();

        assert!(write_default(dir.path(), false).is_err());
        write_default(dir.path(), true).unwrap();
        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(written, DEFAULT_CONFIG);
    }
}
