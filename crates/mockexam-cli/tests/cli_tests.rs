//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mockexam() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mockexam").unwrap();
    cmd.env_remove("MOCKEXAM_BANK_DIR")
        .env_remove("MOCKEXAM_BANK_URL")
        .env_remove("MOCKEXAM_REDUCED_MOTION");
    cmd
}

/// A temp dir populated by `mockexam init`.
fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

fn report_files(dir: &TempDir, extension: &str) -> Vec<std::path::PathBuf> {
    let out = dir.path().join("mockexam-results");
    let Ok(entries) = std::fs::read_dir(out) else {
        return Vec::new();
    };
    entries
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == extension))
        .collect()
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mockexam.toml"))
        .stdout(predicate::str::contains("Created plan.toml"))
        .stdout(predicate::str::contains("Created banks/chapt1.json"));

    assert!(dir.path().join("banks/chapt2.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan.toml already exists, skipping."));
}

#[test]
fn validate_sample_plan() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["validate", "--plan", "plan.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample mock exam"))
        .stdout(predicate::str::contains("[chapt1.json] 3 questions"))
        .stdout(predicate::str::contains("Plan is valid."));
}

#[test]
fn validate_reports_missing_chapter() {
    let dir = initialized();
    std::fs::remove_file(dir.path().join("banks/chapt2.json")).unwrap();

    mockexam()
        .current_dir(dir.path())
        .args(["validate", "--plan", "plan.toml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[chapt2.json] ERROR"))
        .stderr(predicate::str::contains("1 chapter(s) could not be loaded"));
}

#[test]
fn validate_nonexistent_plan() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["validate", "--plan", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn run_submit_without_answers() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["run", "--plan", "plan.toml", "--reduced-motion", "--seed", "7"])
        .write_stdin("submit!\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You scored 0/4 (0.00%). Time used: 0m 0"))
        .stdout(predicate::str::contains("Sorry, you did not pass the exam."))
        .stdout(predicate::str::contains("Testing throughout the life cycle"));

    let reports = report_files(&dir, "json");
    assert_eq!(reports.len(), 1);
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(json["score"], 0);
    assert_eq!(json["total"], 4);
    assert_eq!(json["verdict"], "fail");
    assert_eq!(json["questions"][0]["selected"], -1);
}

#[test]
fn run_records_answers_and_confirms() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["run", "--plan", "plan.toml", "--reduced-motion", "--seed", "7"])
        .args(["--format", "all"])
        .write_stdin("1 a\n2 b\nsubmit\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Answered 2/4"))
        .stdout(predicate::str::contains(
            "There are 2 unanswered questions. Submit the exam anyway? [y/N]",
        ))
        .stdout(predicate::str::contains("You scored"));

    assert_eq!(report_files(&dir, "json").len(), 1);
    assert_eq!(report_files(&dir, "html").len(), 1);
}

#[test]
fn run_quit_without_submitting() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["run", "--plan", "plan.toml", "--reduced-motion"])
        .write_stdin("time\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Time left: 00:"))
        .stdout(predicate::str::contains("No exam was submitted."));

    assert!(report_files(&dir, "json").is_empty());
}

#[test]
fn run_fails_when_a_chapter_is_missing() {
    let dir = initialized();
    std::fs::remove_file(dir.path().join("banks/chapt1.json")).unwrap();

    mockexam()
        .current_dir(dir.path())
        .args(["run", "--plan", "plan.toml"])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Unable to load the questions for chapter chapt1.json",
        ))
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn run_rejects_unknown_format() {
    let dir = initialized();

    mockexam()
        .current_dir(dir.path())
        .args(["run", "--plan", "plan.toml", "--format", "sarif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}
