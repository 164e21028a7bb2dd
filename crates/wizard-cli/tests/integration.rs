#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wizard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wizard").unwrap();
    cmd.current_dir(dir.path()).env("WIZARD_ROOT", dir.path());
    cmd
}

/// `wizard init` plus an instant submission backend.
fn init_project(dir: &TempDir) {
    wizard(dir).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".wizard/config.yaml"),
        "application_prefix: SSA\nsubmission:\n  latency_ms: 0\n",
    )
    .unwrap();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn submit(dir: &TempDir, step: &str, data: &str) {
    wizard(dir)
        .args(["step", "submit", step, "--data", data])
        .assert()
        .success();
}

fn complete_all_steps(dir: &TempDir) {
    submit(dir, "personalInfo", r#"{"name":"Jo"}"#);
    submit(dir, "professionalInfo", r#"{"income":1200}"#);
    submit(dir, "additionalInfo", r#"{"situation":"laid off"}"#);
}

// ---------------------------------------------------------------------------
// wizard init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    wizard(&dir).arg("init").assert().success();

    assert!(dir.path().join(".wizard").is_dir());
    assert!(dir.path().join(".wizard/storage").is_dir());
    assert!(dir.path().join(".wizard/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    wizard(&dir).arg("init").assert().success();
    wizard(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    wizard(&dir)
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wizard init"));
}

// ---------------------------------------------------------------------------
// wizard step / check / next
// ---------------------------------------------------------------------------

#[test]
fn fresh_wizard_points_at_step1() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let next = json_output(wizard(&dir).args(["--json", "next"]));
    assert_eq!(next["route"], "/step1");

    let check = json_output(wizard(&dir).args(["--json", "check", "/step3"]));
    assert_eq!(check["allowed"], false);
    assert_eq!(check["redirect"], "/step1");
}

#[test]
fn submitting_step1_unlocks_step2() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    wizard(&dir)
        .args(["step", "submit", "1", "--data", r#"{"name":"Jo"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: step 2"));

    let check = json_output(wizard(&dir).args(["--json", "check", "/step2"]));
    assert_eq!(check["allowed"], true);

    let state = json_output(wizard(&dir).args(["--json", "state"]));
    assert_eq!(state["steps"]["personalInfo"]["isCompleted"], true);
    assert_eq!(state["progress"], 1);
}

#[test]
fn submitting_locked_step_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    wizard(&dir)
        .args(["step", "submit", "additionalInfo", "--data", r#"{"situation":"x"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn rejected_submission_fails_with_message() {
    let dir = TempDir::new().unwrap();
    wizard(&dir).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".wizard/config.yaml"),
        "submission:\n  fail_with: service offline\n",
    )
    .unwrap();

    wizard(&dir)
        .args(["step", "submit", "personalInfo", "--data", r#"{"name":"Jo"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("service offline"));
}

#[test]
fn non_object_answers_are_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    wizard(&dir)
        .args(["step", "submit", "personalInfo", "--data", "[1,2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn step_show_lists_saved_answers() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    submit(&dir, "personalInfo", r#"{"name":"Jo"}"#);

    wizard(&dir)
        .args(["step", "show", "personalInfo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal Information"))
        .stdout(predicate::str::contains("Jo"));
}

#[test]
fn draft_on_completed_step_relocks_later_steps() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    complete_all_steps(&dir);

    let draft = json_output(wizard(&dir).args([
        "--json",
        "step",
        "draft",
        "professionalInfo",
        "--data",
        r#"{"income":900}"#,
    ]));
    assert_eq!(draft["outcome"]["invalidated"], true);
    assert_eq!(draft["saved"], true);

    let check = json_output(wizard(&dir).args(["--json", "check", "/step3"]));
    assert_eq!(check["redirect"], "/step2");
}

// ---------------------------------------------------------------------------
// wizard summary / reset / nav
// ---------------------------------------------------------------------------

#[test]
fn summary_requires_all_steps() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    wizard(&dir)
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not complete"));
}

#[test]
fn summary_number_is_stable() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    complete_all_steps(&dir);

    let first = json_output(wizard(&dir).args(["--json", "summary"]));
    let second = json_output(wizard(&dir).args(["--json", "summary"]));
    let number = first["applicationNumber"].as_str().unwrap();
    assert!(number.starts_with("SSA-"), "{number}");
    assert_eq!(first["applicationNumber"], second["applicationNumber"]);
    assert_eq!(first["data"]["personalInfo"]["name"], "Jo");
}

#[test]
fn reset_clears_everything() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    complete_all_steps(&dir);
    wizard(&dir).arg("summary").assert().success();

    let state = json_output(wizard(&dir).args(["--json", "reset"]));
    assert_eq!(state["allCompleted"], false);
    assert!(state.get("applicationNumber").is_none());

    wizard(&dir)
        .args(["step", "show", "personalInfo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no answers yet"));
}

#[test]
fn reset_keep_answers_keeps_fields() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    complete_all_steps(&dir);

    let state = json_output(wizard(&dir).args(["--json", "reset", "--keep-answers"]));
    assert_eq!(state["lastCompletedStep"], 0);

    wizard(&dir)
        .args(["step", "show", "personalInfo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jo"));
}

#[test]
fn nav_clamps_at_last_form_step() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    for _ in 0..4 {
        wizard(&dir).args(["nav", "next"]).assert().success();
    }
    let nav = json_output(wizard(&dir).args(["--json", "nav", "show"]));
    assert_eq!(nav["progress"], 2);

    let nav = json_output(wizard(&dir).args(["--json", "nav", "reset"]));
    assert_eq!(nav["progress"], 0);
}
