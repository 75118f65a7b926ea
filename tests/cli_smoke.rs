use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tt").expect("binary");
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn add_and_list_tasks() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args(["task", "add", "write docs", "--status", "IN_PROGRESS"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task 1"));

    tt(&dir)
        .args(["task", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("write docs"))
        .stdout(predicate::str::contains("IN_PROGRESS"));
}

#[test]
fn schedule_conflict_exits_with_code_3() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args([
            "task",
            "add",
            "first",
            "--start",
            "24.08.2026 12:20",
            "--duration",
            "10",
        ])
        .assert()
        .success();

    tt(&dir)
        .args([
            "task",
            "add",
            "second",
            "--start",
            "24.08.2026 12:15",
            "--duration",
            "10",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("overlaps"));

    // The rejected task must not be in the file.
    tt(&dir)
        .args(["task", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks: 1"));
}

#[test]
fn touching_windows_are_accepted() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args([
            "task", "add", "first", "--start", "24.08.2026 12:00", "--duration", "30",
        ])
        .assert()
        .success();

    tt(&dir)
        .args([
            "task", "add", "second", "--start", "24.08.2026 12:30", "--duration", "30",
        ])
        .assert()
        .success();

    tt(&dir)
        .args(["prioritized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduled items: 2"));
}

#[test]
fn epic_aggregates_subtasks_across_invocations() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir).args(["epic", "add", "release"]).assert().success();

    tt(&dir)
        .args([
            "subtask",
            "add",
            "--epic",
            "1",
            "cut branch",
            "--status",
            "DONE",
            "--start",
            "24.08.2026 10:00",
            "--duration",
            "5",
        ])
        .assert()
        .success();

    tt(&dir)
        .args(["epic", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DONE"));

    tt(&dir)
        .args(["subtask", "add", "--epic", "1", "announce"])
        .assert()
        .success();

    tt(&dir)
        .args(["epic", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IN_PROGRESS"));
}

#[test]
fn conflicting_update_exits_with_code_3_and_keeps_old_window() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args([
            "task", "add", "first", "--start", "24.08.2026 09:00", "--duration", "30",
        ])
        .assert()
        .success();
    tt(&dir)
        .args([
            "task", "add", "second", "--start", "24.08.2026 14:00", "--duration", "30",
        ])
        .assert()
        .success();

    tt(&dir)
        .args([
            "task", "update", "2", "second", "--start", "24.08.2026 09:15", "--duration", "30",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("overlaps"));

    tt(&dir)
        .args(["task", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("24.08.2026 14:00"));
}

#[test]
fn unknown_id_exits_with_code_2() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args(["task", "show", "42"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No task with id 42"));
}

#[test]
fn deleting_unknown_id_succeeds() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir).args(["task", "rm", "42"]).assert().success();
}

#[test]
fn history_tracks_views_newest_first() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir).args(["task", "add", "one"]).assert().success();
    tt(&dir).args(["task", "add", "two"]).assert().success();

    tt(&dir).args(["task", "show", "1"]).assert().success();
    tt(&dir).args(["task", "show", "2"]).assert().success();
    tt(&dir).args(["task", "show", "1"]).assert().success();

    let output = tt(&dir).args(["history"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).expect("utf8");
    let one = stdout.find("one").expect("task one listed");
    let two = stdout.find("two").expect("task two listed");
    assert!(one < two, "most recent view should be listed first");
}

#[test]
fn json_output_uses_envelope() {
    let dir = TempDir::new().expect("tempdir");

    tt(&dir)
        .args(["--json", "task", "add", "payload"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"schema_version\": \"tt.v1\""))
        .stdout(predicate::str::contains("\"status\": \"success\""));

    tt(&dir)
        .args(["--json", "epic", "show", "9"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"kind\": \"user_error\""));
}
