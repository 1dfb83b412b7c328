//! CLI integration: load records into a temp store, then read them back.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn registra() -> Command {
    Command::cargo_bin("registra").expect("binary")
}

fn write_record(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write record");
    path
}

const RECORD: &str = r#"{
    "id": "R1",
    "title": "T",
    "landingPage": "https://data.example/od/id/R1",
    "components": [{"downloadURL": "https://data.example/od/ds/R1/a.csv"}]
}"#;

#[test]
fn load_then_show_round_trips_a_record() {
    let home = TempDir::new().expect("home");
    let data = TempDir::new().expect("data");
    let store = home.path().join("store");
    let record = write_record(data.path(), "r1.json", RECORD);

    registra()
        .env("HOME", home.path())
        .args(["load", record.to_str().expect("utf-8 path")])
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 attempted, 3 succeeded, 0 failed"));

    registra()
        .env("HOME", home.path())
        .args(["show", "R1", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"R1\""))
        .stdout(predicate::str::contains("\"version\": \"1.0.0\""));

    registra()
        .env("HOME", home.path())
        .args(["show", "R1", "--version", "1.0.0", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("R1/pdr:v/1.0.0"));
}

#[test]
fn history_lists_the_initial_release() {
    let home = TempDir::new().expect("home");
    let data = TempDir::new().expect("data");
    let store = home.path().join("store");
    let record = write_record(data.path(), "r1.json", RECORD);

    registra()
        .env("HOME", home.path())
        .args(["load", record.to_str().expect("utf-8 path")])
        .arg("--store")
        .arg(&store)
        .assert()
        .success();

    registra()
        .env("HOME", home.path())
        .args(["history", "R1", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"))
        .stdout(predicate::str::contains("initial release"));
}

#[test]
fn invalid_record_fails_the_load() {
    let home = TempDir::new().expect("home");
    let data = TempDir::new().expect("data");
    let store = home.path().join("store");
    let record = write_record(data.path(), "bad.json", r#"{"id": "R1"}"#);

    registra()
        .env("HOME", home.path())
        .args(["load", record.to_str().expect("utf-8 path")])
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stdout(predicate::str::contains("required property 'title' is missing"));
}

#[test]
fn no_validate_accepts_a_sparse_record() {
    let home = TempDir::new().expect("home");
    let data = TempDir::new().expect("data");
    let store = home.path().join("store");
    let record = write_record(data.path(), "sparse.json", r#"{"id": "R1"}"#);

    registra()
        .env("HOME", home.path())
        .args(["load", record.to_str().expect("utf-8 path"), "--no-validate"])
        .arg("--store")
        .arg(&store)
        .assert()
        .success();
}

#[test]
fn json_output_reports_outcomes() {
    let home = TempDir::new().expect("home");
    let data = TempDir::new().expect("data");
    let store = home.path().join("store");
    let record = write_record(data.path(), "r1.json", RECORD);

    registra()
        .env("HOME", home.path())
        .args(["load", record.to_str().expect("utf-8 path"), "--json"])
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"attempted\": 3"))
        .stdout(predicate::str::contains("\"outcome\": \"written\""))
        .stdout(predicate::str::contains("\"version\": \"1.0.0\""));
}

#[test]
fn show_of_an_unknown_id_fails_cleanly() {
    let home = TempDir::new().expect("home");
    let store = home.path().join("store");

    registra()
        .env("HOME", home.path())
        .args(["show", "nope", "--store"])
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored record"));
}
