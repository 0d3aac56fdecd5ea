use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn help_lists_the_four_subcommands() {
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn cleanup_help_documents_retention_days() {
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.arg("cleanup")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--retention-days"));
}

#[test]
fn stats_on_a_fresh_store_reports_zeros_and_exits_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("stats")
        .arg("--date")
        .arg("2025-03-10")
        .assert()
        .success()
        .stdout(predicate::str::contains("CLINIC STATISTICS"))
        .stdout(predicate::str::contains("Month 2025-03"))
        .stdout(predicate::str::contains("Consultations: 0"));
}

#[test]
fn stats_rejects_a_window_start_without_an_end() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("stats")
        .arg("--from")
        .arg("2025-03-01")
        .assert()
        .failure();
}

#[test]
fn backup_creates_an_artifact_and_reports_its_size() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created successfully"))
        .stdout(predicate::str::contains("Size:"));

    let backups: Vec<_> = std::fs::read_dir(temp_dir.path().join(".clinic-ops/backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".sqlite3"))
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn cleanup_without_a_log_directory_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("cleanup")
        .assert()
        .failure()
        .stdout(predicate::str::contains("could not start"));
}

#[test]
fn cleanup_on_an_empty_directory_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join(".clinic-ops/logs")).unwrap();

    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("cleanup")
        .arg("--retention-days")
        .arg("30")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted files: 0"))
        .stdout(predicate::str::contains("Cleanup completed"));
}

#[test]
fn health_text_output_shows_score_and_components() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    // Exit code depends on the machine's actual resources; only the shape
    // of the output is asserted here.
    let assert = cmd
        .current_dir(temp_dir.path())
        .arg("health")
        .arg("--verbose")
        .assert();
    assert
        .stdout(predicate::str::contains("CLINIC-OPS HEALTH CHECK"))
        .stdout(predicate::str::contains("Overall score:"))
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("RECOMMENDATION"));
}

#[test]
fn health_json_output_is_machine_readable() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("clinic-ops").unwrap();
    let output = cmd
        .current_dir(temp_dir.path())
        .arg("health")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["overall_score"].is_number());
    assert!(parsed["components"].is_array());
    assert_eq!(parsed["components"].as_array().unwrap().len(), 4);
    assert!(parsed["recommendation"].is_string());
}
