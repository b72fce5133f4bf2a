//! Integration tests for the autohaul-sim binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_autohaul-sim"))
}

#[test]
fn help_lists_subcommands() {
    sim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("default-config"));
}

#[test]
fn default_config_json_is_parseable() -> TestResult {
    let output = sim().args(["default-config", "json"]).output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["control"]["faults"]["critical_temp_c"], 120);
    assert_eq!(value["control"]["navigation"]["cruise_speed"], 30);
    assert_eq!(value["sensor_period_ms"], 100);
    Ok(())
}

#[test]
fn default_config_yaml_round_trips_through_run() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("sim.yaml");
    let output = sim().arg("default-config").output()?;
    fs::write(&path, &output.stdout)?;

    sim()
        .args(["run", "--duration", "1", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("TASK PERFORMANCE REPORT"));
    Ok(())
}

#[test]
fn run_reports_json_summary() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("quiet.json");
    fs::write(&path, r#"{ "control": { "elevate_priorities": false } }"#)?;

    let output = sim()
        .args(["run", "--duration", "1", "--report", "json", "--config"])
        .arg(&path)
        .output()?;
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["scenario"], "nominal");
    assert_eq!(summary["interrupted"], false);
    assert_eq!(summary["final_state"]["fault"], false);
    assert!(summary["tasks"]["command_logic"]["sample_count"].as_u64() > Some(0));
    assert!(summary["tasks"]["fault_monitor"].is_object());
    assert!(summary["tasks"]["navigation"].is_object());
    assert!(summary["tasks"]["sensor_producer"]["sample_count"].as_u64() > Some(0));
    Ok(())
}

#[test]
fn invalid_config_exits_with_code_2() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "control:\n  faults:\n    critical_temp_c: 50\n")?;

    sim()
        .args(["run", "--duration", "1", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("alert_temp_c"));
    Ok(())
}

#[test]
fn missing_config_exits_with_code_2() {
    sim()
        .args(["run", "--config", "/nonexistent/autohaul.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn unsupported_extension_exits_with_code_2() {
    sim()
        .args(["run", "--config", "settings.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported config format"));
}
