//! Lint and analyze command implementation.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use swiftlint_core::{Config, LintResult, Runner, SeverityPolicy};
use swiftlint_rules::registry;
use swiftlint_syntax::SwiftParser;

use crate::OutputFormat;

/// Options shared by `lint` and `analyze`.
#[derive(Args, Debug, Default)]
pub struct LintArgs {
    /// Files or directories to lint (default: `included` from config, else ".")
    pub paths: Vec<PathBuf>,

    /// Report every warning as an error
    #[arg(long)]
    pub strict: bool,

    /// Report every error as a warning
    #[arg(long)]
    pub lenient: bool,

    /// Correct violations in place before linting
    #[arg(long)]
    pub fix: bool,

    /// Output format (default: `reporter` from config, else text)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Only run these rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only_rules: Vec<String>,

    /// Ignore `.swiftlint.toml` files below the linted directories
    #[arg(long)]
    pub no_nested_configs: bool,
}

/// Runs a lint pass; non-empty `compiler_arguments` run analyzer rules instead.
pub fn run(args: &LintArgs, config_path: Option<&Path>, compiler_arguments: Vec<String>) -> Result<ExitCode> {
    let (result, format) = execute(args, config_path, compiler_arguments)?;
    super::output::print(&result, format)?;

    let code = SeverityPolicy::exit_code(&result);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Lints, applies the severity policy, and picks the output format.
fn execute(
    args: &LintArgs,
    config_path: Option<&Path>,
    compiler_arguments: Vec<String>,
) -> Result<(LintResult, OutputFormat)> {
    let mut config = super::load_config(&project_dir(&args.paths), config_path)?;
    apply_overrides(&mut config, args);
    let format = output_format(args.format, &config)?;
    let policy = SeverityPolicy::from_config(&config);
    let analyzing = !compiler_arguments.is_empty();

    let mut builder = Runner::builder(registry(), Arc::new(SwiftParser::new()))
        .paths(args.paths.iter().cloned())
        .config(config)
        .compiler_arguments(compiler_arguments)
        .nested_configs(!args.no_nested_configs);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.clone());
    }
    let runner = builder.build().context("Failed to configure linter")?;

    if analyzing && !runner.rules().iter().any(|rule| rule.as_analyzer().is_some()) {
        tracing::warn!("No analyzer rules enabled; list them under analyzer_rules");
    }
    tracing::info!("Running {} rules", runner.rules().len());

    let mut result = if args.fix { runner.correct() } else { runner.lint() }.context("Lint run failed")?;
    policy.apply(&mut result);
    Ok((result, format))
}

fn apply_overrides(config: &mut Config, args: &LintArgs) {
    config.strict |= args.strict;
    config.lenient |= args.lenient;
    if !args.only_rules.is_empty() {
        config.only_rules = Some(args.only_rules.clone());
        config.disabled_rules.clear();
        config.opt_in_rules.clear();
    }
}

/// Directory whose configuration applies: the first path, or its parent if
/// it is a file.
fn project_dir(paths: &[PathBuf]) -> PathBuf {
    let dir = match paths.first() {
        Some(path) if path.is_file() => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        Some(path) => path.clone(),
        None => PathBuf::from("."),
    };
    dir.canonicalize().unwrap_or(dir)
}

fn output_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match config.reporter.as_deref() {
        None => Ok(OutputFormat::default()),
        Some(name) => match OutputFormat::from_str(name, true) {
            Ok(format) => Ok(format),
            Err(_) => bail!("Unknown reporter '{name}' (expected text, json, compact or pretty)"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use swiftlint_core::Severity;
    use tempfile::TempDir;

    fn project(config: &str, files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".swiftlint.toml"), config).unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn args(dir: &TempDir) -> LintArgs {
        LintArgs {
            paths: vec![dir.path().to_path_buf()],
            ..LintArgs::default()
        }
    }

    #[test]
    fn lints_with_the_project_config() {
        let dir = project(
            "only_rules = [\"force_cast\"]\nreporter = \"compact\"\n",
            &[("App.swift", "let x = y as! Int\n")],
        );
        let (result, format) = execute(&args(&dir), None, Vec::new()).unwrap();
        assert_eq!(format, OutputFormat::Compact);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule_id, "force_cast");
        assert_eq!(SeverityPolicy::exit_code(&result), 2);
    }

    #[test]
    fn lenient_flag_downgrades_errors() {
        let dir = project("only_rules = [\"force_cast\"]\n", &[("App.swift", "let x = y as! Int\n")]);
        let lenient = LintArgs {
            lenient: true,
            ..args(&dir)
        };
        let (result, _) = execute(&lenient, None, Vec::new()).unwrap();
        assert_eq!(result.violations[0].severity, Severity::Warning);
        assert_eq!(SeverityPolicy::exit_code(&result), 0);
    }

    #[test]
    fn only_rules_flag_replaces_rule_lists() {
        let dir = project(
            "disabled_rules = [\"trailing_whitespace\"]\n",
            &[("App.swift", "let x = y as! Int  \n")],
        );
        let only = LintArgs {
            only_rules: vec!["trailing_whitespace".to_string()],
            ..args(&dir)
        };
        let (result, _) = execute(&only, None, Vec::new()).unwrap();
        let ids: Vec<_> = result.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["trailing_whitespace"]);
    }

    #[test]
    fn analyze_runs_analyzer_rules() {
        let dir = project(
            "analyzer_rules = [\"unused_import\"]\n",
            &[("App.swift", "import Foundation\nimport Foundation\n")],
        );
        let arguments = vec!["-module-name".to_string(), "App".to_string()];
        let (result, _) = execute(&args(&dir), None, arguments).unwrap();
        let ids: Vec<_> = result.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["unused_import"]);
    }

    #[test]
    fn invalid_config_aborts_the_run() {
        let dir = project("only_rules = [\"no_such_rule\"]\n", &[("App.swift", "let a = 1\n")]);
        let error = execute(&args(&dir), None, Vec::new()).unwrap_err();
        assert!(format!("{error:#}").contains("no_such_rule"), "{error:#}");
    }

    #[test]
    fn unknown_reporter_is_rejected() {
        let config = Config::parse("reporter = \"xml\"").unwrap();
        assert!(output_format(None, &config).is_err());
        assert_eq!(output_format(Some(OutputFormat::Json), &config).unwrap(), OutputFormat::Json);
    }

    #[test]
    fn project_dir_of_a_file_is_its_parent() {
        let dir = project("", &[("App.swift", "")]);
        let found = project_dir(&[dir.path().join("App.swift")]);
        assert_eq!(found, dir.path().canonicalize().unwrap());
    }
}
