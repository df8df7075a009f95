//! End-to-end tests for the pkgscan CLI
//!
//! These tests verify:
//! - Dry-run mode parses every input shape without network access
//! - Each output format in dry-run mode
//! - Exit codes for empty, missing and conflicting inputs
//!
//! Only offline paths are exercised here; scanning against fakes lives in
//! the integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pkgscan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pkgscan"))
}

/// Create a directory holding a sample package.json
fn create_test_project() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let package_json = r#"{
  "name": "test-project",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.21",
    "@types/node": "~20.1.0"
  },
  "devDependencies": {
    "typescript": ">=5.0.0"
  }
}"#;
    fs::write(temp_dir.path().join("package.json"), package_json).unwrap();

    temp_dir
}

mod dry_run_tests {
    use super::*;

    #[test]
    fn test_dry_run_package_json() {
        let temp_dir = create_test_project();

        pkgscan()
            .args(["--dry-run"])
            .arg(temp_dir.path().join("package.json"))
            .assert()
            .success()
            .stdout(predicate::str::contains("3 packages detected"))
            .stdout(predicate::str::contains("lodash@4.17.21"))
            .stdout(predicate::str::contains("@types/node@20.1.0"))
            .stdout(predicate::str::contains("typescript@5.0.0"));
    }

    #[test]
    fn test_dry_run_leaves_file_unchanged() {
        let temp_dir = create_test_project();
        let path = temp_dir.path().join("package.json");
        let original = fs::read_to_string(&path).unwrap();

        pkgscan().arg("-n").arg(&path).assert().success();

        assert_eq!(original, fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_dry_run_stdin_token_list() {
        pkgscan()
            .arg("--dry-run")
            .write_stdin("react@^18.2.0\nexpress\n@babel/core@7.22.0\n\n}\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("3 packages detected"))
            .stdout(predicate::str::contains("react@18.2.0"))
            .stdout(predicate::str::contains("express@latest"))
            .stdout(predicate::str::contains("@babel/core@7.22.0"));
    }

    #[test]
    fn test_dry_run_quiet_prints_count_only() {
        pkgscan()
            .args(["--dry-run", "--quiet", "-"])
            .write_stdin("react\nvue\n")
            .assert()
            .success()
            .stdout("2 packages detected\n");
    }

    #[test]
    fn test_dry_run_json_output_schema() {
        let output = pkgscan()
            .args(["--dry-run", "--json"])
            .write_stdin(r#"{"dependencies":{"lodash":"~4.17.21"}}"#)
            .output()
            .unwrap();

        assert!(output.status.success());
        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["packages"][0]["name"], "lodash");
        assert_eq!(parsed["packages"][0]["versionSpec"], "4.17.21");
    }

    #[test]
    fn test_dry_run_csv_output() {
        pkgscan()
            .args(["--dry-run", "--csv"])
            .write_stdin("lodash@4.17.21\n")
            .assert()
            .success()
            .stdout("Package,Version\nlodash,4.17.21\n");
    }

    #[test]
    fn test_dry_run_keeps_duplicates() {
        pkgscan()
            .args(["--dry-run", "-q"])
            .write_stdin("react\nreact\n")
            .assert()
            .success()
            .stdout("2 packages detected\n");
    }
}

mod exit_code_tests {
    use super::*;

    #[test]
    fn test_empty_input_exits_3() {
        pkgscan()
            .arg("--dry-run")
            .write_stdin("")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("No packages found"));
    }

    #[test]
    fn test_garbage_input_exits_3() {
        pkgscan()
            .write_stdin("{{{garbage")
            .assert()
            .code(3)
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn test_missing_file_exits_3() {
        pkgscan()
            .arg("/nonexistent/package.json")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("input file not found"));
    }

    #[test]
    fn test_invalid_config_exits_3() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = temp_dir.path().join("pkgscan.toml");
        fs::write(&config, "fetch_timeout_secs = 0\n").unwrap();

        pkgscan()
            .arg("--config")
            .arg(&config)
            .write_stdin("react\n")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("fetch_timeout_secs"));
    }

    #[test]
    fn test_json_and_csv_conflict() {
        pkgscan()
            .args(["--json", "--csv", "--dry-run"])
            .write_stdin("react\n")
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        pkgscan()
            .args(["--quiet", "--verbose", "--dry-run"])
            .write_stdin("react\n")
            .assert()
            .failure();
    }

    #[test]
    fn test_invalid_fail_on_rejected() {
        pkgscan()
            .args(["--fail-on", "severe", "--dry-run"])
            .write_stdin("react\n")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid severity"));
    }
}

mod cli_info_tests {
    use super::*;

    #[test]
    fn test_help() {
        pkgscan()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--dry-run"))
            .stdout(predicate::str::contains("--fail-on"));
    }

    #[test]
    fn test_version() {
        pkgscan()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pkgscan"));
    }
}
