//! Reporters for lint results.

use anyhow::Result;
use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use swiftlint_core::{LintResult, Location, Position, Violation, ViolationDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    print!("{}", render(result, format)?);
    Ok(())
}

/// Renders lint results in the specified format.
pub fn render(result: &LintResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => serde_json::to_string_pretty(result)? + "\n",
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Pretty => render_pretty(result),
    })
}

fn render_text(result: &LintResult) -> String {
    let mut out = String::new();
    for correction in &result.corrections {
        let _ = writeln!(out, "{} Corrected {}", correction.location, correction.rule_id);
    }
    for violation in &result.violations {
        let _ = writeln!(out, "{violation}");
    }
    out.push_str(&summary(result));
    out
}

fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(|v| format!("{}: {} [{}] {}\n", v.location, v.severity, v.rule_id, v.reason))
        .collect()
}

fn render_pretty(result: &LintResult) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut sources: BTreeMap<&Path, Option<String>> = BTreeMap::new();
    let mut out = String::new();

    for violation in &result.violations {
        let contents = violation.location.file.as_deref().and_then(|path| {
            sources
                .entry(path)
                .or_insert_with(|| std::fs::read_to_string(path).ok())
                .clone()
                .map(|contents| (path, contents))
        });
        let rendered = contents.is_some_and(|(path, contents)| {
            let report = diagnostic_report(violation, path, contents);
            handler.render_report(&mut out, &*report).is_ok()
        });
        if !rendered {
            let _ = writeln!(out, "{violation}");
        }
    }
    out.push_str(&summary(result));
    out
}

/// A violation with its file attached, labelled at the reported character.
fn diagnostic_report(violation: &Violation, path: &Path, contents: String) -> Report {
    let offset = violation
        .position
        .map_or_else(|| offset_of(&contents, &violation.location), Position::offset)
        .min(contents.len());
    let length = contents
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8);
    let diagnostic = ViolationDiagnostic::new(&violation.clone().with_position(Position(offset)), length);
    Report::new(diagnostic).with_source_code(NamedSource::new(path.display().to_string(), contents))
}

/// Byte offset of a 1-based line and character.
fn offset_of(contents: &str, location: &Location) -> usize {
    let line_start: usize = contents
        .split_inclusive('\n')
        .take(location.line.saturating_sub(1))
        .map(str::len)
        .sum();
    let column = location.character.map_or(0, |c| c.saturating_sub(1));
    let line = contents[line_start..].lines().next().unwrap_or_default();
    line_start + line.char_indices().nth(column).map_or(line.len(), |(i, _)| i)
}

fn summary(result: &LintResult) -> String {
    let (errors, _) = result.count_by_severity();
    format!(
        "Done linting! Found {} violation(s), {} serious in {} file(s).\n",
        result.violations.len(),
        errors,
        result.files_checked
    )
}
