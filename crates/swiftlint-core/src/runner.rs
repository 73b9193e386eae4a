//! Multi-file runs: discovery, the two-phase protocol, and severity policy.

use crate::config::{Config, ConfigError};
use crate::file::SwiftLintFile;
use crate::linter::{CollectedLinter, Linter, RuleSet};
use crate::location::Location;
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::storage::RuleStorage;
use crate::syntax::SourceParser;
use crate::types::{LintResult, Severity, Violation};

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name of per-directory configuration.
pub const CONFIG_FILE_NAME: &str = ".swiftlint.toml";

/// Identifier of the synthetic violation for unparseable files.
pub const PARSE_ERROR_RULE: &str = "parse_error";

/// Identifier of the synthetic violation for a breached warning threshold.
pub const WARNING_THRESHOLD_RULE: &str = "warning_threshold";

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// IO error during discovery.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("Failed to walk files: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker pool could not start.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring a [`Runner`].
pub struct RunnerBuilder {
    registry: RuleRegistry,
    parser: Arc<dyn SourceParser>,
    paths: Vec<PathBuf>,
    config: Config,
    compiler_arguments: Vec<String>,
    exclude_patterns: Vec<String>,
    nested_configs: bool,
}

impl RunnerBuilder {
    /// Creates a builder for the given rules and parser.
    #[must_use]
    pub fn new(registry: RuleRegistry, parser: Arc<dyn SourceParser>) -> Self {
        Self {
            registry,
            parser,
            paths: Vec::new(),
            config: Config::default(),
            compiler_arguments: Vec::new(),
            exclude_patterns: Vec::new(),
            nested_configs: true,
        }
    }

    /// Adds a file or directory to lint.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Adds files or directories to lint.
    #[must_use]
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the root configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets compiler arguments, which switch the run to analyzer rules.
    #[must_use]
    pub fn compiler_arguments(mut self, arguments: Vec<String>) -> Self {
        self.compiler_arguments = arguments;
        self
    }

    /// Adds an exclude glob pattern on top of the configured ones.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Whether `.swiftlint.toml` files below the roots apply (default: true).
    #[must_use]
    pub fn nested_configs(mut self, enabled: bool) -> Self {
        self.nested_configs = enabled;
        self
    }

    /// Resolves rules and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, invalid exclude patterns,
    /// or if the worker pool cannot start.
    pub fn build(self) -> Result<Runner, RunnerError> {
        let rules = self.config.enabled_rules(&self.registry)?;
        debug!(
            "Enabled rules: {}",
            rules.iter().map(|r| r.identifier()).collect::<Vec<_>>().join(", ")
        );

        let excludes = self
            .config
            .excluded
            .iter()
            .chain(&self.exclude_patterns)
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.config.parallelism {
            pool = pool.num_threads(threads);
        }

        let paths = if !self.paths.is_empty() {
            self.paths
        } else if !self.config.included.is_empty() {
            self.config.included.clone()
        } else {
            vec![PathBuf::from(".")]
        };

        Ok(Runner {
            registry: self.registry,
            parser: self.parser,
            paths,
            config: self.config,
            rules: Arc::new(rules),
            compiler_arguments: self.compiler_arguments,
            excludes,
            nested_configs: self.nested_configs,
            pool: pool.build()?,
        })
    }
}

/// Lints many files in parallel.
///
/// Phase 1 (collection) runs for every file before phase 2 (validation)
/// starts for any of them.
pub struct Runner {
    registry: RuleRegistry,
    parser: Arc<dyn SourceParser>,
    paths: Vec<PathBuf>,
    config: Config,
    rules: RuleSet,
    compiler_arguments: Vec<String>,
    excludes: Vec<glob::Pattern>,
    nested_configs: bool,
    pool: rayon::ThreadPool,
}

struct Discovered {
    files: Vec<PathBuf>,
    config_dirs: BTreeSet<PathBuf>,
}

impl Runner {
    /// Creates a new builder.
    #[must_use]
    pub fn builder(registry: RuleRegistry, parser: Arc<dyn SourceParser>) -> RunnerBuilder {
        RunnerBuilder::new(registry, parser)
    }

    /// The root configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rules enabled by the root configuration, sorted by identifier.
    #[must_use]
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Lints every discovered file.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or a nested configuration is
    /// invalid. Unreadable and unparseable files do not abort the run.
    pub fn lint(&self) -> Result<LintResult, RunnerError> {
        let discovered = self.discover()?;
        info!("Linting {} files", discovered.files.len());
        let (files, mut result) = self.load(&discovered)?;
        let linted = self.lint_files(files);
        result.extend(linted);
        result.sort();
        info!(
            "Done linting: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );
        Ok(result)
    }

    /// Corrects every discovered file in place, then lints what remains.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or a nested configuration is
    /// invalid.
    pub fn correct(&self) -> Result<LintResult, RunnerError> {
        let discovered = self.discover()?;
        info!("Correcting {} files", discovered.files.len());
        let (files, mut result) = self.load(&discovered)?;

        let storage = RuleStorage::new();
        let mut collected = self.collect(files, &storage);
        storage.seal();
        let corrections: Vec<_> = self.pool.install(|| {
            collected
                .par_iter_mut()
                .flat_map_iter(|linter| match linter.correct(&storage) {
                    Ok(corrections) => corrections,
                    Err(e) => {
                        warn!("Failed to write {}: {e}", linter.file().display_name());
                        Vec::new()
                    }
                })
                .collect()
        });
        info!("Applied {} corrections", corrections.len());

        let files = collected.into_iter().map(CollectedLinter::into_parts).collect();
        result.extend(self.lint_files(files));
        result.corrections = corrections;
        result.sort();
        Ok(result)
    }

    /// Lints in-memory files against the root rule set.
    #[must_use]
    pub fn lint_sources<I, S>(&self, sources: I) -> LintResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = sources
            .into_iter()
            .map(|source| {
                let file = SwiftLintFile::virtual_file(source, Arc::clone(&self.parser));
                (file, Arc::clone(&self.rules))
            })
            .collect();
        let mut result = self.lint_files(files);
        result.sort();
        result
    }

    fn lint_files(&self, files: Vec<(SwiftLintFile, RuleSet)>) -> LintResult {
        let storage = RuleStorage::new();
        let collected = self.collect(files, &storage);
        storage.seal();

        let per_file: Vec<(Vec<Violation>, bool)> = self.pool.install(|| {
            collected
                .par_iter()
                .map(|linter| {
                    let mut violations = linter.style_violations(&storage);
                    let parse_error = linter.file().parse_error();
                    if let Some(error) = &parse_error {
                        warn!("Failed to parse {}: {error}", linter.file().display_name());
                        violations.push(parse_failure(linter.file().path(), &error.to_string()));
                    }
                    (violations, parse_error.is_some())
                })
                .collect()
        });

        let mut result = LintResult::new();
        result.files_checked = per_file.len();
        for (violations, failed) in per_file {
            result.violations.extend(violations);
            result.parse_failures += usize::from(failed);
        }
        result
    }

    fn collect<'s>(
        &'s self,
        files: Vec<(SwiftLintFile, RuleSet)>,
        storage: &RuleStorage,
    ) -> Vec<CollectedLinter<'s>> {
        self.pool.install(|| {
            files
                .into_par_iter()
                .map(|(file, rules)| {
                    Linter::with_compiler_arguments(file, rules, &self.registry, &self.compiler_arguments)
                        .collect(storage)
                })
                .collect()
        })
    }

    fn load(&self, discovered: &Discovered) -> Result<(Vec<(SwiftLintFile, RuleSet)>, LintResult), RunnerError> {
        let rule_sets = self.rule_sets(discovered)?;
        let loaded: Vec<_> = self.pool.install(|| {
            discovered
                .files
                .par_iter()
                .map(|path| (path, SwiftLintFile::from_path(path, Arc::clone(&self.parser))))
                .collect()
        });

        let mut files = Vec::new();
        let mut failures = LintResult::new();
        for (path, file) in loaded {
            match file {
                Ok(file) => {
                    let rules = rule_sets
                        .get(path)
                        .cloned()
                        .unwrap_or_else(|| Arc::clone(&self.rules));
                    files.push((file, rules));
                }
                Err(e) => {
                    warn!("Failed to read {}: {e}", path.display());
                    failures.files_checked += 1;
                    failures.parse_failures += 1;
                    failures
                        .violations
                        .push(parse_failure(Some(path), &e.to_string()));
                }
            }
        }
        Ok((files, failures))
    }

    fn discover(&self) -> Result<Discovered, RunnerError> {
        let mut files = BTreeSet::new();
        let mut config_dirs = BTreeSet::new();
        for root in &self.paths {
            if root.is_file() {
                files.insert(root.clone());
                continue;
            }
            let mut builder = ignore::WalkBuilder::new(root);
            builder
                .hidden(false)
                .git_ignore(self.config.respects_gitignore())
                .filter_entry(|entry| entry.file_name() != ".git");
            for entry in builder.build() {
                let entry = entry?;
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                if self.is_excluded(root, path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }
                if path.file_name().is_some_and(|n| n == CONFIG_FILE_NAME) {
                    if let Some(dir) = path.parent().filter(|dir| *dir != root.as_path()) {
                        config_dirs.insert(dir.to_path_buf());
                    }
                } else if path.extension().is_some_and(|e| e == "swift") {
                    files.insert(path.to_path_buf());
                }
            }
        }
        Ok(Discovered {
            files: files.into_iter().collect(),
            config_dirs,
        })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path(relative) || pattern.matches_path(path))
    }

    /// Rule sets for files below nested configuration directories.
    fn rule_sets(&self, discovered: &Discovered) -> Result<BTreeMap<PathBuf, RuleSet>, RunnerError> {
        let mut by_chain: BTreeMap<Vec<PathBuf>, RuleSet> = BTreeMap::new();
        let mut by_file = BTreeMap::new();
        if !self.nested_configs || discovered.config_dirs.is_empty() {
            return Ok(by_file);
        }
        for path in &discovered.files {
            let mut chain: Vec<PathBuf> = path
                .ancestors()
                .skip(1)
                .filter(|dir| discovered.config_dirs.contains(*dir))
                .map(Path::to_path_buf)
                .collect();
            if chain.is_empty() {
                continue;
            }
            chain.reverse();
            let rules = match by_chain.get(&chain) {
                Some(rules) => Arc::clone(rules),
                None => {
                    let mut config = self.config.clone();
                    for dir in &chain {
                        let nested = Config::from_file(&dir.join(CONFIG_FILE_NAME))?;
                        debug!("Applying nested config in {}", dir.display());
                        config = config.merged(&nested);
                    }
                    let rules: RuleSet = Arc::new(config.enabled_rules(&self.registry)?);
                    by_chain.insert(chain, Arc::clone(&rules));
                    rules
                }
            };
            by_file.insert(path.clone(), rules);
        }
        Ok(by_file)
    }
}

fn parse_failure(path: Option<&Path>, message: &str) -> Violation {
    Violation::new(
        PARSE_ERROR_RULE,
        "Parse Error",
        Severity::Warning,
        Location::new(path.map(Path::to_path_buf), 1, None),
        format!("File could not be parsed: {message}"),
    )
}

/// Run-level severity adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityPolicy {
    /// Report every warning as an error.
    pub strict: bool,
    /// Report every error as a warning; disables the threshold.
    pub lenient: bool,
    /// Number of warnings that fails the run.
    pub warning_threshold: Option<usize>,
}

impl SeverityPolicy {
    /// Reads the policy from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict: config.strict,
            lenient: config.lenient,
            warning_threshold: config.warning_threshold,
        }
    }

    /// Rewrites severities and adds the threshold violation if breached.
    ///
    /// Strict mode wins when both modes are set.
    pub fn apply(&self, result: &mut LintResult) {
        if self.strict {
            for violation in &mut result.violations {
                violation.severity = Severity::Error;
            }
        } else if self.lenient {
            for violation in &mut result.violations {
                violation.severity = Severity::Warning;
            }
            return;
        }

        let Some(threshold) = self.warning_threshold else {
            return;
        };
        let (_, warnings) = result.count_by_severity();
        if warnings >= threshold {
            result.violations.push(Violation::new(
                WARNING_THRESHOLD_RULE,
                "Warning Threshold",
                Severity::Error,
                Location::new(None, 1, None),
                format!("Number of warnings exceeded threshold of {threshold}."),
            ));
        }
    }

    /// Process exit code for a finished run: 2 if any error remains, 0 otherwise.
    #[must_use]
    pub fn exit_code(result: &LintResult) -> i32 {
        if result.has_errors() {
            2
        } else {
            0
        }
    }
}
