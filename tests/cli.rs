//! CLI integration tests for the paths that never reach the network:
//! argument parsing, pre-flight validation, and configuration errors.
//!
//! stdout is not a TTY here, so errors arrive as structured JSON on
//! stderr; assertions match on the machine-readable error codes.

use assert_cmd::Command;
use predicates::prelude::*;

fn flagctl() -> Command {
    let mut cmd = Command::cargo_bin("flagctl").unwrap();
    // Isolate from the developer's environment.
    cmd.env_remove("FLAGCTL_API_KEY")
        .env_remove("FLAGCTL_PROJECT")
        .env_remove("FLAGCTL_BASE_URL")
        .env_remove("FLAGCTL_FLAG")
        .env_remove("FLAGCTL_ENVIRONMENT");
    cmd
}

#[test]
fn version_prints_json_on_pipe() {
    flagctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn completions_generate() {
    flagctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flagctl"));
}

#[test]
fn add_rule_rejects_bad_percentage_sum() {
    flagctl()
        .args([
            "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--percentages", "80,30", "--yes",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("INVALID_PERCENTAGES"))
        .stderr(predicate::str::contains("110"));
}

#[test]
fn add_rule_rejects_malformed_pattern() {
    flagctl()
        .args([
            "add-rule", "Users API", "invalid-pattern",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--percentages", "80,20", "--yes",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("INVALID_PATTERN"));
}

#[test]
fn add_rule_rejects_lowercase_method() {
    flagctl()
        .args([
            "add-rule", "Users API", "get /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--percentages", "80,20", "--yes",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("INVALID_PATTERN"));
}

#[test]
fn add_rule_rejects_empty_environment() {
    flagctl()
        .args([
            "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "",
            "--percentages", "80,20", "--yes",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("REQUIRED_FIELD"));
}

#[test]
fn add_rule_requires_project() {
    flagctl()
        .args([
            "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--percentages", "80,20", "--yes",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("REQUIRED_FIELD"))
        .stderr(predicate::str::contains("project"));
}

#[test]
fn add_rule_requires_api_key() {
    flagctl()
        .args([
            "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--project", "web",
            "--percentages", "80,20", "--yes",
        ])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("CONFIG_ERROR"))
        .stderr(predicate::str::contains("FLAGCTL_API_KEY"));
}

#[test]
fn add_rule_rejects_negative_position_at_parse() {
    flagctl()
        .args([
            "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
            "--position", "-1", "--yes",
        ])
        .assert()
        .failure()
        .code(2); // clap usage error
}

#[test]
fn get_requires_project() {
    flagctl()
        .args(["get", "api-v2-rollout"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("REQUIRED_FIELD"));
}
