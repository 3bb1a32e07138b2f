//! Common test utilities and fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Creates a temporary directory for test fixtures.
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Creates a mock project structure for testing.
pub fn create_mock_project(dir: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = dir.path().to_path_buf();

    for (path, content) in files {
        write_file(&root, path, content.as_bytes());
    }

    root
}

/// Writes `content` at `root/path`, creating parent directories.
pub fn write_file(root: &Path, path: &str, content: &[u8]) {
    let file_path = root.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&file_path, content).expect("Failed to write file");
}

/// A small web project with priority files, sources and binary assets.
pub fn web_project_files() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "package.json",
            r#"{
  "name": "test-project",
  "version": "1.0.0"
}
"#,
        ),
        ("CLAUDE.md", "# Notes\n\nKeep handlers small.\n"),
        (
            "src/index.ts",
            "export function greet(name: string): string {\n  return `Hello, ${name}!`;\n}\n",
        ),
        ("src/util.ts", "export const answer = 42;\n"),
        ("core/engine.ts", "export class Engine {}\n"),
        ("node_modules/dep/index.js", "module.exports = {};\n"),
        (".hidden/secret.txt", "do not pack\n"),
        ("yarn.lock", "# lockfile\n"),
    ]
}

/// Fixed timestamp so rendered documents are reproducible.
pub fn fixed_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .expect("valid timestamp")
}

/// Paths listed in a rendered document's `<file_list>`, in order.
pub fn listed_paths(document: &str) -> Vec<String> {
    let start = document.find("<file_list>\n").expect("file list start") + "<file_list>\n".len();
    let end = document.find("</file_list>").expect("file list end");
    document[start..end]
        .lines()
        .filter_map(|line| line.strip_prefix("  - "))
        .map(str::to_string)
        .collect()
}

/// Path to the compiled ctxpack binary.
pub fn ctxpack_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ctxpack"))
}

/// Runs the CLI from `dir`, isolated from user config and `CTXPACK_*` variables.
pub fn run_cli(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(ctxpack_bin());
    cmd.args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config-home"))
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("CTXPACK_") {
            cmd.env_remove(key);
        }
    }
    cmd.output().expect("Failed to execute command")
}
