//! Integration tests for the `sdnboard` CLI binary.
//!
//! Argument parsing, completions, the session gate and a few end-to-end
//! runs against a mock controller. Every test gets its own HOME so the
//! config file and session tokens never leak between tests.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sdnboard` binary with env isolation.
///
/// Clears all `SDNBOARD_*` env vars and points config and data
/// directories into `home`.
fn sdnboard_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sdnboard");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("SDNBOARD_PROFILE")
        .env_remove("SDNBOARD_CONTROLLER")
        .env_remove("SDNBOARD_LAYOUT")
        .env_remove("SDNBOARD_OUTPUT")
        .env_remove("SDNBOARD_INSECURE")
        .env_remove("SDNBOARD_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Nothing listens on port 1; commands that reach the network fail fast.
const DEAD_CONTROLLER: &str = "http://127.0.0.1:1";

fn login(home: &Path, controller: &str) {
    sdnboard_cmd(home)
        .args(["--controller", controller, "login", "-u", "admin", "--password-stdin"])
        .write_stdin("admin\n")
        .assert()
        .success();
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = sdnboard_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Ryu SDN controller")
            .and(predicate::str::contains("hosts"))
            .and(predicate::str::contains("thresholds"))
            .and(predicate::str::contains("topology")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sdnboard"));
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .arg("flows")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .args(["-o", "xml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef sdnboard"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_under_home() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_then_show() {
    let home = TempDir::new().unwrap();
    sdnboard_cmd(home.path())
        .args(["config", "set", "controller", "http://10.0.0.10:8080"])
        .assert()
        .success();
    sdnboard_cmd(home.path())
        .args(["config", "set", "layout", "services"])
        .assert()
        .success();

    sdnboard_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("http://10.0.0.10:8080"))
                .and(predicate::str::contains("layout = \"services\"")),
        );
}

#[test]
fn test_config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    let output = sdnboard_cmd(home.path())
        .args(["config", "set", "site", "default"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("unknown config key"));
}

// ── Session gate ────────────────────────────────────────────────────

#[test]
fn test_no_controller_configured() {
    let home = TempDir::new().unwrap();
    let output = sdnboard_cmd(home.path())
        .args(["hosts", "connected"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("config init"));
}

#[test]
fn test_protected_command_requires_login() {
    let home = TempDir::new().unwrap();
    let output = sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "hosts", "connected"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Not logged in"));
}

#[test]
fn test_wrong_password_is_refused() {
    let home = TempDir::new().unwrap();
    let output = sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "login", "-u", "admin", "--password-stdin"])
        .write_stdin("nope\n")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Invalid credentials"));
}

#[test]
fn test_login_status_logout() {
    let home = TempDir::new().unwrap();
    login(home.path(), DEAD_CONTROLLER);

    sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "-o", "json-compact", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""logged_in":true"#));

    sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "logout"])
        .assert()
        .success();

    sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "-o", "plain", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logged-out"));
}

#[test]
fn test_invalid_threshold_never_reaches_controller() {
    let home = TempDir::new().unwrap();
    login(home.path(), DEAD_CONTROLLER);

    let output = sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "thresholds", "set", "1", "2", "abc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Invalid number"));
}

#[test]
fn test_unreachable_controller_is_a_connection_error() {
    let home = TempDir::new().unwrap();
    login(home.path(), DEAD_CONTROLLER);

    let output = sdnboard_cmd(home.path())
        .args(["--controller", DEAD_CONTROLLER, "hosts", "blocked"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

// ── Against a mock controller ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hosts_connected_with_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connected_ips"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(["10.0.0.1", "10.0.0.2", "192.168.1.7"]),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        login(home.path(), &uri);
        sdnboard_cmd(home.path())
            .args(["--controller", &uri, "-o", "plain", "hosts", "connected", "-s", "10.0"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "10.0.0.1\n10.0.0.2\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_prints_notice_and_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/block_ip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocked_ips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(["10.0.0.9"]))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        login(home.path(), &uri);
        sdnboard_cmd(home.path())
            .args(["--controller", &uri, "hosts", "block", " 10.0.0.9 "])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("IP Blocked"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_topology_dot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "switches": [{"dpid": 1}, {"dpid": 2}],
            "hosts": [{"mac": "aa", "ip": "10.0.0.1", "dpid": 1, "port": 3}],
            "links": [{"src": 1, "dst": 2, "src_port": 2, "dst_port": 1}]
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        login(home.path(), &uri);
        sdnboard_cmd(home.path())
            .args(["--controller", &uri, "topology", "-f", "dot"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let dot = String::from_utf8_lossy(&output.stdout);
    assert!(dot.starts_with("digraph topology {"));
    assert!(dot.contains(r#""s1" -> "aa""#));
    assert!(dot.contains(r#""s1" -> "s2""#));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_topology_failure_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topology"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        login(home.path(), &uri);
        sdnboard_cmd(home.path())
            .args(["--controller", &uri, "topology"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Topology could not be loaded"));
}
