use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use std::fs;

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".vant");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\nuser.role=manager\n", db_path.display()),
    )
    .unwrap();
    (temp_dir, guard)
}

fn vant_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vant").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd
}

/// Add a lead and return its full id
fn add_lead(temp_dir: &TempDir, name: &str) -> String {
    vant_cmd(temp_dir).args(["add", name]).assert().success();
    let output = vant_cmd(temp_dir).args(["leads", "all", "--json"]).assert().success();
    let leads: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    leads
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["name"] == name)
        .map(|l| l["id"].as_str().unwrap().to_string())
        .unwrap()
}

#[test]
fn test_stages_listed_in_order() {
    let (temp_dir, _guard) = setup_test_env();
    let output = vant_cmd(&temp_dir).args(["stages"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let new_pos = stdout.find("New Contacts").unwrap();
    let won_pos = stdout.find("Closed Won").unwrap();
    assert!(new_pos < won_pos);
}

#[test]
fn test_add_ignores_requested_stage() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["add", "Ivy", "Stone", "--stage", "scheduled_meetings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("in New Contacts"));

    let output = vant_cmd(&temp_dir).args(["leads", "--json"]).assert().success();
    let leads: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(leads[0]["name"], "Ivy Stone");
    assert_eq!(leads[0]["stage_id"], "new_contacts");
}

#[test]
fn test_move_by_prefix_and_slug() {
    let (temp_dir, _guard) = setup_test_env();
    let id = add_lead(&temp_dir, "Jo");

    vant_cmd(&temp_dir)
        .args(["move", &id[..8], "contacted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from New Contacts to Contacted"));

    vant_cmd(&temp_dir)
        .args(["move", &id, "contacted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in that stage"));
}

#[test]
fn test_move_unknown_stage_is_user_error() {
    let (temp_dir, _guard) = setup_test_env();
    let id = add_lead(&temp_dir, "Kai");
    vant_cmd(&temp_dir)
        .args(["move", &id, "nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Stage 'nowhere' not found"));
}

#[test]
fn test_move_unknown_lead_is_user_error() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["move", "deadbeef", "contacted"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_board_hides_closed_lost_column() {
    let (temp_dir, _guard) = setup_test_env();
    add_lead(&temp_dir, "Lea");
    vant_cmd(&temp_dir)
        .env("COLUMNS", "200")
        .args(["board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Contacts (1)"))
        .stdout(predicate::str::contains("Lea"))
        .stdout(predicate::str::contains("Closed Lost").not());
}

#[test]
fn test_nav_uses_configured_role() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["nav"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline"))
        .stdout(predicate::str::contains("Reports").not());

    vant_cmd(&temp_dir)
        .args(["nav", "--role", "owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings"));

    vant_cmd(&temp_dir)
        .args(["nav", "--role", "intern"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown role"));
}

#[test]
fn test_week_buckets_follow_ups() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["add", "Max", "--follow-up", "2026-10-14"])
        .assert()
        .success();
    vant_cmd(&temp_dir)
        .args(["week", "2026-10-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Follow-ups 2026-10-12 .. 2026-10-18"))
        .stdout(predicate::str::contains("Wed 2026-10-14 (1)"))
        .stdout(predicate::str::contains("Max"));
}

#[test]
fn test_week_steps_to_adjacent_weeks() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["add", "Nina", "--follow-up", "2026-10-21"])
        .assert()
        .success();
    vant_cmd(&temp_dir)
        .args(["week", "2026-10-16", "--next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Follow-ups 2026-10-19 .. 2026-10-25"))
        .stdout(predicate::str::contains("Wed 2026-10-21 (1)"))
        .stdout(predicate::str::contains("Nina"));
    vant_cmd(&temp_dir)
        .args(["week", "2026-10-16", "--prev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Follow-ups 2026-10-05 .. 2026-10-11"))
        .stdout(predicate::str::contains("Nina").not());
}

#[test]
fn test_add_rejects_empty_name() {
    let (temp_dir, _guard) = setup_test_env();
    vant_cmd(&temp_dir)
        .args(["add", " "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Lead name cannot be empty"));
}
