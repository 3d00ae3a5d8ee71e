use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ENV_KEYS: [&str; 4] = [
    "PAGEMARK_MAX_DOCUMENTS",
    "PAGEMARK_MAX_ANNOTATIONS",
    "PAGEMARK_MIN_REGION_SIZE",
    "PAGEMARK_ZOOM",
];

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).expect("json serializes"))
        .expect("fixture should be written");
    path
}

fn pagemark(data_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pagemark");
    cmd.env("PAGEMARK_DATA_DIR", data_dir.path()).env_remove("RUST_LOG");
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

fn replay(data_dir: &TempDir, script: &Value, extra: &[&str]) -> Value {
    let path = write_json(data_dir.path(), "script.json", script);
    let output = pagemark(data_dir)
        .arg("replay")
        .arg(path)
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

fn file(name: &str, page_count: u32) -> Value {
    json!({ "name": name, "size": 1, "page_count": page_count })
}

fn page(document_index: usize, page_number: u32) -> Value {
    json!({ "document_index": document_index, "page_number": page_number })
}

#[test]
fn removal_reindexes_annotations_on_later_documents() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = json!({
        "events": [
            { "event": "add_documents", "files": [
                { "name": "a.pdf", "size": 100, "page_count": 3 },
                { "name": "b.pdf", "size": 50, "page_count": 2 }
            ]},
            { "event": "pointer_down", "x": 10.0, "y": 10.0, "page": page(1, 1) },
            { "event": "pointer_move", "x": 60.0, "y": 50.0 },
            { "event": "pointer_up", "x": 60.0, "y": 50.0 },
            { "event": "remove_document", "index": 0 }
        ]
    });

    let report = replay(&temp, &script, &[]);

    assert_eq!(report["current_page"], page(0, 1));
    assert_eq!(report["plan"]["total_size"], 50);
    let documents = report["plan"]["documents"].as_array().expect("documents array");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["name"], "b.pdf");

    let pages = documents[0]["pages"].as_array().expect("pages array");
    assert_eq!(pages.len(), 2);
    let annotation = &pages[0]["annotations"][0];
    assert_eq!(annotation["page"], page(0, 1));
    assert_eq!(annotation["variant"], "region");
    let bounds = json!({ "x": 10.0, "y": 10.0, "width": 50.0, "height": 40.0 });
    assert_eq!(annotation["bounds"], bounds);
}

#[test]
fn drag_moves_annotation_by_creation_index() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = json!({
        "events": [
            { "event": "add_documents", "files": [file("a.pdf", 1)] },
            { "event": "field_drag_started", "field": "initials" },
            { "event": "field_dropped", "field": "initials", "x": 300.0, "y": 400.0 },
            { "event": "pointer_down", "x": 210.0, "y": 380.0, "annotation": 0 },
            { "event": "pointer_move", "x": 110.0, "y": 80.0 },
            { "event": "pointer_up", "x": 110.0, "y": 80.0 }
        ]
    });

    let report = replay(&temp, &script, &[]);

    let annotation = &report["plan"]["documents"][0]["pages"][0]["annotations"][0];
    assert_eq!(annotation["variant"], "field");
    assert_eq!(annotation["kind"], "initials");
    assert_eq!(annotation["required"], false);
    assert_eq!(annotation["bounds"]["x"], 100.0);
    assert_eq!(annotation["bounds"]["y"], 70.0);
    assert_eq!(report["selected"], annotation["id"]);
}

#[test]
fn leaving_the_page_mid_draw_creates_the_region() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = json!({
        "events": [
            { "event": "add_documents", "files": [file("a.pdf", 1)] },
            { "event": "pointer_down", "x": 10.0, "y": 10.0 },
            { "event": "pointer_move", "x": 200.0, "y": 200.0 },
            { "event": "pointer_leave" },
            { "event": "select", "annotation": 0 }
        ]
    });

    let report = replay(&temp, &script, &[]);

    let annotation = &report["plan"]["documents"][0]["pages"][0]["annotations"][0];
    let bounds = json!({ "x": 10.0, "y": 10.0, "width": 190.0, "height": 190.0 });
    assert_eq!(annotation["bounds"], bounds);
    assert_eq!(annotation["variant"], "region");
    assert_eq!(report["plan"]["annotation_count"], 1);
}

#[test]
fn scoped_numbering_labels_every_page() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = json!({
        "events": [
            { "event": "add_documents", "files": [file("a.pdf", 3)] },
            { "event": "commit", "scope": { "scope": "all" }, "operation": {
                "operation": "number_pages", "format": "roman_upper", "prefix": "p. "
            }}
        ]
    });

    let report = replay(&temp, &script, &[]);

    let labels: Vec<&str> = report["plan"]["documents"][0]["pages"]
        .as_array()
        .expect("pages array")
        .iter()
        .map(|page| page["label"]["text"].as_str().expect("label text"))
        .collect();
    assert_eq!(labels, vec!["p. I", "p. II", "p. III"]);
}

#[test]
fn document_overflow_is_reported_as_a_notice() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let config = write_json(temp.path(), "limits.json", &json!({ "max_documents": 1 }));
    let script = json!({
        "events": [
            { "event": "add_documents", "files": [
                { "name": "a.pdf", "size": 1, "page_count": 1 },
                { "name": "b.pdf", "size": 1, "page_count": 1 }
            ]}
        ]
    });

    let report = replay(&temp, &script, &["--config", config.to_str().expect("utf-8 path")]);

    assert_eq!(report["notices"][0]["step"], 0);
    assert_eq!(report["notices"][0]["message"], "document limit of 1 reached: 1 file(s) dropped");
    assert_eq!(report["plan"]["documents"].as_array().map(Vec::len), Some(1));
}

#[test]
fn strict_replay_fails_on_capacity_errors() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_json(
        temp.path(),
        "script.json",
        &json!({
            "events": [
                { "event": "add_documents", "files": [
                    { "name": "a.pdf", "size": 1, "page_count": 1 },
                    { "name": "b.pdf", "size": 1, "page_count": 1 }
                ]}
            ]
        }),
    );

    pagemark(&temp)
        .env("PAGEMARK_MAX_DOCUMENTS", "1")
        .arg("replay")
        .arg(script)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("step 0: document limit of 1 reached"));
}

#[test]
fn unknown_annotation_reference_fails() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_json(
        temp.path(),
        "script.json",
        &json!({
            "events": [
                { "event": "add_documents", "files": [file("a.pdf", 1)] },
                { "event": "select", "annotation": 3 }
            ]
        }),
    );

    pagemark(&temp)
        .arg("replay")
        .arg(script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("annotation #3 has not been created"));
}

#[test]
fn replay_fails_for_missing_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    pagemark(&temp)
        .arg("replay")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn replay_fails_for_malformed_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = json!({ "events": [{ "event": "teleport" }] });
    let script = write_json(temp.path(), "script.json", &script);

    pagemark(&temp)
        .arg("replay")
        .arg(script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid script"));
}

#[test]
fn config_applies_saved_file_and_env_overrides() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    write_json(
        temp.path(),
        "editor-config.json",
        &json!({ "version": 1, "config": { "max_annotations": 7 } }),
    );

    let output = pagemark(&temp)
        .env("PAGEMARK_ZOOM", "2")
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    assert_eq!(config["max_annotations"], 7);
    assert_eq!(config["zoom"], 2.0);
    assert_eq!(config["max_documents"], 10);
}

#[test]
fn version_prints_package_version() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    pagemark(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
