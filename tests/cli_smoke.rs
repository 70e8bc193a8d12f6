use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const SCENARIO: &str = r#"[
    {"sha": "c1", "date": "2024-01-01T09:00:00Z", "author": "Ada", "message": "start"},
    {"sha": "c2", "date": "2024-01-01T11:30:00Z", "author": "Ada", "message": "more"},
    {"sha": "c3", "date": "2024-01-03T14:00:00Z", "author": "Bob", "message": "fix"}
]"#;

const HOSTED: &str = r#"[
    {
        "sha": "h2",
        "commit": {"author": {"name": "Ada", "email": "ada@example.com", "date": "2024-01-08T00:30:00Z"}, "message": "second"},
        "html_url": "https://example.com/h2"
    },
    {
        "sha": "h1",
        "commit": {"author": {"name": "Ada", "email": "ada@example.com", "date": "2024-01-07T23:30:00Z"}, "message": "first"},
        "html_url": "https://example.com/h1"
    }
]"#;

fn write_export(root: &Path, repo: &str, body: &str) {
    let path = root.join(format!("{repo}.json"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn githours(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("githours").unwrap();
    cmd.current_dir(dir)
        .env_remove("GITHOURS_REPOS")
        .env_remove("GITHOURS_AUTHOR");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn estimate_json_reports_scenario() {
    let dir = tempdir().unwrap();
    write_export(dir.path(), "scenario", SCENARIO);

    let v = json_stdout(githours(dir.path()).args(["estimate", "--json", "scenario.json"]));
    assert_eq!(v["estimate"]["hours"].as_f64(), Some(6.5));
    assert_eq!(v["estimate"]["session_count"].as_u64(), Some(2));
    assert_eq!(v["estimate"]["commit_count"].as_u64(), Some(3));
    assert_eq!(v["weekly_stats"]["2024-01-01"]["commit_count"].as_u64(), Some(3));
}

#[test]
fn analyze_json_isolates_failures() {
    let dir = tempdir().unwrap();
    let exports = dir.path().join("exports");
    write_export(&exports, "acme/scenario", SCENARIO);
    write_export(&exports, "acme/broken", r#"[{"date": "not a timestamp"}]"#);

    let v = json_stdout(
        githours(dir.path())
            .arg("--exports")
            .arg(&exports)
            .args(["analyze", "--json", "acme/scenario", "acme/broken", "acme/missing"]),
    );

    let repos = v["repositories"].as_array().unwrap();
    assert_eq!(repos.len(), 3);
    assert_eq!(repos[0]["repository"], "acme/scenario");
    assert_eq!(repos[0]["estimated_hours"].as_f64(), Some(6.5));
    assert_eq!(repos[0]["session_count"].as_u64(), Some(2));
    assert_eq!(repos[0]["last_commit_timestamp"], "2024-01-03T14:00:00Z");
    assert!(repos[1]["error"].as_str().unwrap().contains("not a timestamp"));
    assert!(repos[2]["error"].as_str().unwrap().contains("not found"));

    assert_eq!(v["summary"]["total_projects"].as_u64(), Some(1));
    assert_eq!(v["summary"]["failed_projects"].as_u64(), Some(2));
    assert_eq!(v["summary"]["total_hours"].as_f64(), Some(6.5));
}

#[test]
fn analyze_respects_author_and_tunables() {
    let dir = tempdir().unwrap();
    let exports = dir.path().join("exports");
    write_export(&exports, "acme/scenario", SCENARIO);

    let v = json_stdout(
        githours(dir.path())
            .arg("--exports")
            .arg(&exports)
            .args(["--author", "ada", "--max-commit-gap", "3h", "--first-commit-bonus", "30m"])
            .args(["analyze", "--json", "acme/scenario"]),
    );
    let report = &v["repositories"][0];
    assert_eq!(report["total_commits"].as_u64(), Some(2));
    assert_eq!(report["estimated_hours"].as_f64(), Some(3.0));
}

#[test]
fn repositories_can_come_from_env() {
    let dir = tempdir().unwrap();
    let exports = dir.path().join("exports");
    write_export(&exports, "acme/one", SCENARIO);
    write_export(&exports, "acme/two", HOSTED);

    let mut cmd = githours(dir.path());
    cmd.env("GITHOURS_REPOS", "acme/one,acme/two")
        .arg("--exports")
        .arg(&exports)
        .args(["analyze", "--ndjson"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["repository"], "acme/two");
    assert_eq!(lines[1]["estimated_hours"].as_f64(), Some(3.0));
}

#[test]
fn import_then_weekly_from_store() {
    let dir = tempdir().unwrap();
    write_export(dir.path(), "hosted", HOSTED);

    githours(dir.path())
        .args(["import", "acme/hosted", "hosted.json"])
        .assert()
        .success();
    assert!(dir.path().join(".githours/store.db").exists());

    let v = json_stdout(githours(dir.path()).args(["weekly", "--json", "acme/hosted"]));
    let weeks = v["weeks"].as_array().unwrap();
    let keys: Vec<&str> = weeks.iter().map(|w| w["week"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["2024-01-01", "2024-01-08"]);
    let total: u64 = weeks.iter().map(|w| w["commit_count"].as_u64().unwrap()).sum();
    assert_eq!(total, 2);
    // The session crossing Sunday midnight is counted once per week.
    let hours: f64 = weeks.iter().map(|w| w["hours"].as_f64().unwrap()).sum();
    assert_eq!(hours, 4.0);
}

#[test]
fn analyze_defaults_to_stored_repositories() {
    let dir = tempdir().unwrap();
    write_export(dir.path(), "scenario", SCENARIO);
    write_export(dir.path(), "hosted", HOSTED);

    for (repo, file) in [("acme/scenario", "scenario.json"), ("acme/hosted", "hosted.json")] {
        githours(dir.path()).args(["import", repo, file]).assert().success();
    }

    let v = json_stdout(githours(dir.path()).args(["analyze", "--json"]));
    let names: Vec<&str> = v["repositories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["repository"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["acme/hosted", "acme/scenario"]);
    assert_eq!(v["summary"]["total_hours"].as_f64(), Some(9.5));
}

#[test]
fn analyze_with_empty_store_fails() {
    let dir = tempdir().unwrap();
    githours(dir.path()).arg("analyze").assert().failure();
}

#[test]
fn zero_gap_is_rejected() {
    let dir = tempdir().unwrap();
    write_export(dir.path(), "scenario", SCENARIO);

    githours(dir.path())
        .args(["--max-commit-gap", "0s", "estimate", "scenario.json"])
        .assert()
        .failure();

    githours(dir.path())
        .args(["--max-commit-gap", "500us", "estimate", "scenario.json"])
        .assert()
        .failure();
}

#[test]
fn analyze_without_repositories_fails() {
    let dir = tempdir().unwrap();
    let exports = dir.path().join("exports");
    fs::create_dir_all(&exports).unwrap();

    githours(dir.path())
        .arg("--exports")
        .arg(&exports)
        .arg("analyze")
        .assert()
        .failure();
}

#[test]
fn reversed_date_range_fails() {
    let dir = tempdir().unwrap();
    write_export(dir.path(), "scenario", SCENARIO);

    githours(dir.path())
        .args(["--since", "2024-02-01", "--until", "2024-01-01", "estimate", "scenario.json"])
        .assert()
        .failure();
}
