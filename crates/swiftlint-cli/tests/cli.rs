//! Runs the `swiftlint` binary against temporary projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn swiftlint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swiftlint"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("SWIFTLINT_CONFIG_DIR", dir.join("no-global"))
        .output()
        .unwrap()
}

fn project(config: &str, source: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".swiftlint.toml"), config).unwrap();
    fs::write(dir.path().join("App.swift"), source).unwrap();
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn errors_exit_with_two() {
    let dir = project("only_rules = [\"force_cast\"]\n", "let x = y as! Int\n");
    let output = swiftlint(dir.path(), &["lint", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(2));
    let out = stdout(&output);
    assert!(out.contains("App.swift:1:11: error [force_cast]"), "{out}");
}

#[test]
fn warnings_alone_exit_with_zero() {
    let dir = project("only_rules = [\"force_cast\"]\n", "let x = y as! Int\n");
    let output = swiftlint(dir.path(), &["lint", "--lenient"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Found 1 violation(s), 0 serious in 1 file(s)."));
}

#[test]
fn warning_threshold_fails_the_run() {
    let dir = project(
        "only_rules = [\"trailing_whitespace\"]\nwarning_threshold = 1\n",
        "let a = 1  \n",
    );
    let output = swiftlint(dir.path(), &["lint"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("(warning_threshold)"));
}

#[test]
fn fix_rewrites_and_reports_clean() {
    let dir = project("only_rules = [\"trailing_whitespace\"]\n", "let a = 1  \n");
    let output = swiftlint(dir.path(), &["lint", "--fix"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(fs::read_to_string(dir.path().join("App.swift")).unwrap(), "let a = 1\n");
    assert!(stdout(&output).contains("Corrected trailing_whitespace"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = project("only_rules = [\"bogus\"]\n", "let a = 1\n");
    let output = swiftlint(dir.path(), &["lint"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bogus"));
}

#[test]
fn analyze_requires_compiler_arguments() {
    let dir = project("analyzer_rules = [\"unused_import\"]\n", "import App\n");
    let output = swiftlint(dir.path(), &["analyze", "--compiler-args", " "]);
    assert_eq!(output.status.code(), Some(1));

    let output = swiftlint(dir.path(), &["analyze", "--compiler-args", "-module-name App", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["violations"][0]["rule_id"], "unused_import");
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    assert!(swiftlint(dir.path(), &["init"]).status.success());
    assert!(dir.path().join(".swiftlint.toml").is_file());
    assert_eq!(swiftlint(dir.path(), &["init"]).status.code(), Some(1));
    assert!(swiftlint(dir.path(), &["init", "--force"]).status.success());
}

#[test]
fn rules_lists_the_catalogue() {
    let dir = TempDir::new().unwrap();
    let output = swiftlint(dir.path(), &["rules"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for id in ["force_cast", "reduce_boolean", "unused_import", "superfluous_disable_command"] {
        assert!(out.contains(id), "{id} missing:\n{out}");
    }
}
