//! Subcommand implementations.

pub mod init;
pub mod lint;
pub mod output;
pub mod rules;

use anyhow::{Context, Result};
use std::path::Path;
use swiftlint_core::Config;

use crate::config_resolver::{self, ConfigSource};

/// Resolves and loads the root configuration for `project_dir`.
pub fn load_config(project_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    let source = config_resolver::resolve(project_dir, explicit);
    match &source {
        ConfigSource::Default => {
            tracing::debug!("No configuration found, using defaults");
            Ok(Config::default())
        }
        other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            } else {
                tracing::debug!("Using config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}
