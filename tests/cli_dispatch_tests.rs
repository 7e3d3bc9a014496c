use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_roguesim")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("roguesim-{name}-{stamp}.yaml"))
}

fn roguesim() -> Command {
    let mut command = Command::new(bin());
    command.env_remove("ROGUESIM_CATALOG");
    command
}

#[test]
fn missing_command_prints_usage() {
    let output = roguesim().output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: roguesim"));
}

#[test]
fn generate_command_emits_mission_json() {
    let output = roguesim()
        .args(["generate", "1", "NOVICE", "initiate_recon_sweep"])
        .output()
        .expect("generate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("generate should emit json");
    assert_eq!(payload["mission"]["blueprint_id"], "initiate_password_spray");
    assert_eq!(payload["progression"]["unlocked_tiers"][0], "INITIATE");
}

#[test]
fn batch_command_emits_requested_count() {
    let output = roguesim()
        .args(["batch", "18", "elite", "4"])
        .output()
        .expect("batch should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("batch should emit json");
    assert_eq!(payload.as_array().map(Vec::len), Some(4));
}

#[test]
fn batch_command_rejects_count_outside_limit() {
    for count in ["0", "26", "4000000000", "many"] {
        let output = roguesim()
            .args(["batch", "1", "NOVICE", count])
            .output()
            .expect("batch should run");

        assert_eq!(output.status.code(), Some(2), "count {count}");
        assert!(output.stdout.is_empty(), "count {count}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("must be between 1 and 25"), "count {count}: {stderr}");
    }
}

#[test]
fn report_command_clamps_max_level() {
    let output = roguesim()
        .args(["report", "2000000000", "--csv"])
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Header plus levels 1..=100 for every rank.
    assert_eq!(stdout.lines().count(), 1 + 100 * 8);
    assert!(stdout.lines().last().is_some_and(|line| line.starts_with("100,MYTHIC")));
    assert!(String::from_utf8_lossy(&output.stderr).contains("clamping"));
}

#[test]
fn report_command_writes_csv() {
    let output = roguesim()
        .args(["report", "3", "--csv"])
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    let header = lines.next().expect("csv should have a header");
    assert!(header.starts_with("level,reputation"));
    // Levels 1..=3 for every rank.
    assert_eq!(lines.count(), 3 * 8);
}

#[test]
fn validate_command_passes_builtin_catalog() {
    let output = roguesim()
        .arg("validate")
        .output()
        .expect("validate should run");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_command_fails_on_out_of_range_difficulty() {
    let path = unique_temp_path("bad-catalog");
    fs::write(
        &path,
        r#"
tiers:
  - id: ONLY
    label: Only
    unlock: { min_level: 1, min_reputation: NOVICE }
    missions:
      - id: lonely_job
        title: Lonely
        synopsis: s
        target: t
        recommended_level: 1
        difficulty: 12
        rewards: { credits: 100, reputation: 2 }
"#,
    )
    .expect("temp catalog should be writable");

    let output = roguesim()
        .args(["validate", path.to_str().expect("temp path should be utf-8")])
        .output()
        .expect("validate should run");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("difficulty 12"));
    assert!(stderr.contains("validation failed"));
}

#[test]
fn catalog_override_is_used_for_generation() {
    let path = unique_temp_path("override");
    fs::write(
        &path,
        r#"
tiers:
  - id: SANDBOX
    label: Sandbox
    unlock: { min_level: 1, min_reputation: UNKNOWN }
    missions:
      - { id: sandbox_ping, title: Ping, synopsis: s, target: t, recommended_level: 1, difficulty: 1, rewards: { credits: 10, reputation: 1 } }
"#,
    )
    .expect("temp catalog should be writable");

    let output = Command::new(bin())
        .env("ROGUESIM_CATALOG", &path)
        .args(["generate", "1", "novice"])
        .output()
        .expect("generate should run");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout)
        .expect("generate should emit json");
    assert_eq!(payload["tier"]["id"], "SANDBOX");
}
