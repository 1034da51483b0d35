use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn node(id: &str, sector: Option<&str>) -> Value {
    let mut node = json!({
        "kind": "node",
        "id": id,
        "label": id,
        "size": 20.0,
        "position": { "x": 1.0, "y": 2.0 }
    });
    if let Some(sector) = sector {
        node["sector"] = json!(sector);
        node["doc_type"] = json!("décision");
        node["title"] = json!("relative à des pratiques");
        node["date"] = json!("2020-03-12T00:00:00Z");
    }
    node
}

fn edge(source: &str, target: &str) -> Value {
    json!({
        "kind": "edge",
        "id": format!("{source}_{target}"),
        "source": source,
        "target": target,
        "citation_count": 2
    })
}

#[allow(deprecated)]
fn citenet(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("citenet").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("CITENET_SHARD_DIR")
        .env("CITENET_CONFIG", workdir.join("citenet.toml"));
    cmd
}

fn pack(workdir: &Path, name: &str, elements: Value, target: &[&str]) {
    let input = workdir.join(name);
    fs::write(&input, serde_json::to_vec(&elements).unwrap()).unwrap();
    citenet(workdir)
        .arg("pack")
        .arg("--input")
        .arg(&input)
        .args(target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Packed"));
}

fn setup_shards() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("citenet.toml"),
        "[shards]\ndir = \"shards\"\nmin_year = 2020\nmax_year = 2021\n",
    )
    .unwrap();

    let y2020 = json!([
        node("20-D-01", Some("Santé")),
        node("19-D-26", None),
        edge("20-D-01", "19-D-26"),
    ]);
    let y2021 = json!([
        node("21-D-05", Some("Sport")),
        node("20-D-01", Some("Santé")),
        edge("21-D-05", "20-D-01"),
    ]);
    let full = json!([
        node("20-D-01", Some("Santé")),
        node("19-D-26", None),
        edge("20-D-01", "19-D-26"),
        node("21-D-05", Some("Sport")),
        edge("21-D-05", "20-D-01"),
    ]);
    pack(root, "2020.json", y2020, &["--year", "2020"]);
    pack(root, "2021.json", y2021, &["--year", "2021"]);
    pack(root, "full.json", full, &["--full"]);
    temp
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn pack_writes_named_shard_files() {
    let temp = setup_shards();
    let shards = temp.path().join("shards");
    for name in ["elements_2020.dat", "elements_2021.dat", "elements.dat"] {
        assert!(shards.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn compose_reports_counts() {
    let temp = setup_shards();
    citenet(temp.path())
        .args(["compose", "--from", "2020", "--to", "2020"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2020-2020: 3 elements (2 nodes, 1 edges)",
        ));

    let output = citenet(temp.path())
        .args(["compose", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["range"], json!({ "lo": 2020, "hi": 2021 }));
    assert_eq!(body["node_count"], 3);
    assert_eq!(body["edge_count"], 2);
    assert_eq!(body["elements"][0]["data"]["id"], "20-D-01");
}

#[test]
fn render_highlights_selection_and_neighbors() {
    let temp = setup_shards();
    let output = citenet(temp.path())
        .args(["render", "--node", "20-D-01"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);

    let selectors: Vec<&str> = body["stylesheet"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["selector"].as_str().unwrap())
        .collect();
    assert_eq!(
        selectors,
        vec![
            "node",
            "edge",
            "node[id = \"20-D-01\"]",
            "node[id = \"19-D-26\"]",
            "edge[id = \"20-D-01_19-D-26\"]",
            "node[id = \"21-D-05\"]",
            "edge[id = \"21-D-05_20-D-01\"]",
        ]
    );
}

#[test]
fn details_formats_publication() {
    let temp = setup_shards();
    let output = citenet(temp.path())
        .args(["details", "--id", "20-D-01", "--from", "2020", "--to", "2020"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["kind"], "publication");
    assert_eq!(body["date"], "12/03/2020");

    let output = citenet(temp.path())
        .args(["details", "--id", "19-D-26"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["kind"], "not_available");
}

#[test]
fn failures_print_error_envelope() {
    let temp = setup_shards();
    let output = citenet(temp.path())
        .args(["details", "--id", "21-D-05", "--from", "2020", "--to", "2020"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["code"], "not_found");

    let output = citenet(temp.path())
        .args(["render", "--from", "2021", "--to", "2020"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["code"], "invalid_range");

    fs::remove_file(temp.path().join("shards/elements_2021.dat")).unwrap();
    let output = citenet(temp.path())
        .args(["render", "--from", "2021", "--to", "2021"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["code"], "composition_failed");
}

#[test]
fn shard_dir_flag_overrides_config() {
    let temp = setup_shards();
    let empty = temp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    citenet(temp.path())
        .arg("--shard-dir")
        .arg(&empty)
        .args(["compose", "--from", "2020", "--to", "2020"])
        .assert()
        .failure();
}

#[test]
fn pack_rejects_year_outside_domain() {
    let temp = setup_shards();
    fs::write(temp.path().join("one.json"), "[]").unwrap();
    citenet(temp.path())
        .args(["pack", "--input", "one.json", "--year", "2030"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside 2020..=2021"));
}

#[test]
fn export_writes_matching_rows() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("citenet.toml"), "").unwrap();
    fs::write(
        root.join("export_graph.csv"),
        "Publication A,Publication B,Occurrences\n\
         20-D-01,19-D-26,2\n\
         21-D-05,20-D-01,1\n\
         21-D-05,18-D-11,4\n",
    )
    .unwrap();

    citenet(root)
        .args([
            "export",
            "--id",
            "20-D-01",
            "--table",
            "export_graph.csv",
            "--out",
            "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"));

    let written = fs::read_to_string(root.join("out/export_details_20-D-01.csv")).unwrap();
    assert_eq!(written.lines().count(), 3);
}

#[test]
fn schema_describes_render_payload() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("citenet.toml"), "").unwrap();
    let output = citenet(temp.path()).arg("schema").output().unwrap();
    assert!(output.status.success());
    assert!(stdout_json(&output)["properties"]["stylesheet"].is_object());
}
