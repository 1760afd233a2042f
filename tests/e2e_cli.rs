//! CLI end-to-end tests
//!
//! Tests for the signage-agent command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the signage-agent binary
#[allow(deprecated)]
fn agent_cmd() -> Command {
    let mut cmd = Command::cargo_bin("signage-agent").unwrap();
    cmd.env_remove("MASTER_URL").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("signage.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    agent_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    agent_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("signage-agent"))
        .stdout(predicate::str::contains("probe-player"));
}

#[test]
fn test_cli_version_command() {
    agent_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "signage-agent {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_run_help() {
    agent_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--authority-url"))
        .stdout(predicate::str::contains("--cache-dir"));
}

#[test]
fn test_cli_validate_config_file() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[authority]
url = "http://10.1.2.3:5000"

[agent]
poll_interval_ms = 250

[player]
launch = "fallback"
"#,
    );

    agent_cmd()
        .args(["validate", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Authority: http://10.1.2.3:5000"))
        .stdout(predicate::str::contains("Poll interval: 250 ms"))
        .stdout(predicate::str::contains("gpu-fast, gpu-safe, drm"));
}

#[test]
fn test_cli_validate_env_override() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "[authority]\nurl = \"http://10.1.2.3:5000\"\n");

    agent_cmd()
        .env("MASTER_URL", "http://192.168.7.7:5000")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Authority: http://192.168.7.7:5000"));
}

#[test]
fn test_cli_validate_rejects_invalid_config() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "[agent]\npoll_interval_ms = 0\n");

    agent_cmd()
        .args(["validate", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Poll interval cannot be 0"));
}

#[test]
fn test_cli_validate_missing_file() {
    agent_cmd()
        .args(["validate", "/nonexistent/signage.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_cli_check_tools_reports_missing_player() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        "[player]\nprogram = \"signage-test-no-such-player\"\n",
    );

    agent_cmd()
        .args(["--config", config.to_str().unwrap(), "check-tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ signage-test-no-such-player"));
}

#[test]
fn test_cli_probe_player_fails_without_player() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            r#"
[player]
program = "signage-test-no-such-player"
launch = "fallback"
ipc_path = "{dir}/mpv.sock"
log_dir = "{dir}"
"#,
            dir = temp.path().display()
        ),
    );

    agent_cmd()
        .args(["--config", config.to_str().unwrap(), "probe-player"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "tool not found: signage-test-no-such-player",
        ));
}
