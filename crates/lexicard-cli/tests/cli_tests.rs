//! End-to-end tests for the `lexi` binary
//!
//! Every test runs against its own config file and database in a temp dir.
//! Enrichment and push are disabled so no network service is needed.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DIGEST: &str = "swoon\n[Book.epub](Document/Book.epub)\nlanguid\n[Other.epub](o)\n";

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        let db = dir.path().join("data").join("lexicard.db");
        fs::write(
            &config,
            format!(
                "[database]\npath = {:?}\n\n[enrichment]\nenabled = false\n\n[deck]\nenabled = false\n",
                db.to_string_lossy()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn digest(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn lexi(&self) -> Command {
        let mut cmd = Command::cargo_bin("lexi").unwrap();
        cmd.arg("-C").arg(&self.config);
        for var in ["LEXICARD_DB_PATH", "LEXICARD_WATCH_DIR", "LEXICARD_ANKI_URL", "RUST_LOG"] {
            cmd.env_remove(var);
        }
        cmd
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("lexi").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("ingest"));
}

#[test]
fn test_ingest_requires_a_path() {
    let workspace = Workspace::new();
    workspace.lexi().arg("ingest").assert().failure();
}

// ============================================================================
// Ingest
// ============================================================================

#[test]
fn test_ingest_then_skip_unchanged() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);

    workspace
        .lexi()
        .arg("ingest")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{}: 2 entries parsed, 2 new",
            display(&path)
        )));

    workspace
        .lexi()
        .arg("ingest")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged, skipped"));
}

#[test]
fn test_ingest_force_reprocesses() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);

    workspace.lexi().arg("ingest").arg(&path).assert().success();
    workspace
        .lexi()
        .args(["ingest", "--force"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries parsed, 0 new"));
}

#[test]
fn test_relative_and_absolute_paths_share_one_record() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);

    workspace
        .lexi()
        .current_dir(workspace.dir.path())
        .args(["ingest", "digest.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new"));

    workspace
        .lexi()
        .arg("ingest")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged, skipped"));
}

#[test]
fn test_ingest_missing_file_fails_after_other_files() {
    let workspace = Workspace::new();
    let good = workspace.digest("digest.txt", DIGEST);
    let missing = workspace.dir.path().join("missing.txt");

    workspace
        .lexi()
        .arg("ingest")
        .arg(&missing)
        .arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("2 new"))
        .stderr(predicate::str::contains("1 of 2 files failed"));
}

#[test]
fn test_ingest_json_output() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);

    let output = workspace
        .lexi()
        .args(["--format", "json", "ingest"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["status"], "processed");
    assert_eq!(value[0]["entries_inserted"], 2);
}

// ============================================================================
// Entries and files
// ============================================================================

#[test]
fn test_entries_list_show_delete() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);
    workspace.lexi().arg("ingest").arg(&path).assert().success();

    workspace
        .lexi()
        .args(["entries", "list", "--book", "Book.epub"])
        .assert()
        .success()
        .stdout(predicate::str::contains("swoon"))
        .stdout(predicate::str::contains("languid").not());

    workspace
        .lexi()
        .args(["entries", "show", "languid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("languid from Other.epub"))
        .stdout(predicate::str::contains("(no card yet)"));

    workspace.lexi().args(["entries", "delete", "swoon"]).assert().success();
    workspace
        .lexi()
        .args(["entries", "show", "swoon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No entry for 'swoon'"));
}

#[test]
fn test_forgotten_file_is_processed_again() {
    let workspace = Workspace::new();
    let path = workspace.digest("digest.txt", DIGEST);
    workspace.lexi().arg("ingest").arg(&path).assert().success();

    workspace
        .lexi()
        .args(["files", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("digest.txt"));

    workspace
        .lexi()
        .args(["files", "forget"])
        .arg(display(&path))
        .assert()
        .success();

    workspace
        .lexi()
        .arg("ingest")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries parsed, 0 new"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut cmd = Command::cargo_bin("lexi").unwrap();
    cmd.args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));
    assert!(path.exists());

    let mut cmd = Command::cargo_bin("lexi").unwrap();
    cmd.args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_applies_command_line_overrides() {
    let workspace = Workspace::new();

    workspace
        .lexi()
        .args(["--anki-url", "http://127.0.0.1:9999", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:9999"))
        .stdout(predicate::str::contains("Vocabulary"));
}
