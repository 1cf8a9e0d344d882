use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("records").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("circlepack-cli"));
    for var in [
        "DIMENSION_WIDTH",
        "DIMENSION_HEIGHT",
        "LAYOUT_PADDING_CIRCLES",
        "PARSE_DELIMETER",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn tree_aggregates_values() {
    let output = cli()
        .args(["tree", fixture("basic.json").to_string_lossy().as_ref()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes[0]["id"], "some");
    assert_eq!(nodes[0]["value"], 4.0);
    assert_eq!(nodes[0]["depth"], 0);
    let other = nodes.iter().find(|n| n["id"] == "some|other").unwrap();
    assert_eq!(other["label"], "other");
    assert_eq!(other["value"], 3.0);
}

#[test]
fn tree_reads_stdin() {
    cli()
        .arg("tree")
        .write_stdin(r#"[{"id": "some|path", "value": 1}, {"id": "some", "value": 3}]"#)
        .assert()
        .success();
}

#[test]
fn layout_single_record_fills_the_box() {
    let output = cli()
        .args(["layout", "-"])
        .write_stdin(r#"[{"id": "solo", "value": 5}]"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let root = &json["nodes"][0];
    assert_eq!(root["x"], 300.0);
    assert_eq!(root["y"], 300.0);
    assert_eq!(root["r"], 300.0);
    assert_eq!(json["padding"], 10.0);
}

#[test]
fn layout_honors_environment_and_flags() {
    let output = cli()
        .env("DIMENSION_WIDTH", "400")
        .env("DIMENSION_HEIGHT", "200")
        .args(["layout", "--height", "300", "-"])
        .write_stdin(r#"[{"id": "solo", "value": 5}]"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["width"], 400.0);
    assert_eq!(json["height"], 300.0);
    assert_eq!(json["nodes"][0]["r"], 150.0);
}

#[test]
fn environment_delimiter_is_used() {
    let output = cli()
        .env("PARSE_DELIMETER", "/")
        .args(["tree", "-"])
        .write_stdin(r#"[{"id": "usr"}, {"id": "usr/bin", "value": 1}]"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["delimiter"], "/");
    assert_eq!(json["nodes"][1]["label"], "bin");
}

#[test]
fn related_prints_matches_and_ancestors() {
    let output = cli()
        .args([
            "related",
            "--select",
            "path",
            fixture("basic.json").to_string_lossy().as_ref(),
        ])
        .output()
        .unwrap();
    // basic.json has no `path`; only the selection echo and an empty set come back.
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["selection"], serde_json::json!(["path"]));
    assert_eq!(json["ids"], serde_json::json!([]));

    let output = cli()
        .args(["related", "--select", "path", "-"])
        .write_stdin(r#"[{"id": "some|path", "value": 1}, {"id": "some", "value": 3}]"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["ids"],
        serde_json::json!(["some", "some|path"])
    );
}

#[test]
fn render_writes_svg_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("pack.svg");

    cli()
        .args([
            "render",
            "--select",
            "notes",
            "--class",
            "files",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("filesystem.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    let doc = roxmltree::Document::parse(&svg).expect("valid svg");
    let root = doc.root_element();
    assert_eq!(root.attribute("class"), Some("files"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 600 600"));

    let active = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "circle")
        .filter(|n| n.attribute("opacity") == Some("1"))
        .filter_map(|n| n.attribute("data-id"))
        .collect::<Vec<_>>();
    assert_eq!(active, vec!["fs", "fs|home", "fs|home|notes.txt"]);
}

#[test]
fn render_prints_to_stdout() {
    let output = cli()
        .args(["render", fixture("basic.json").to_string_lossy().as_ref()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<circle").count(), 4);
    assert!(!svg.contains("opacity"));
}

#[test]
fn malformed_records_exit_with_one() {
    let output = cli()
        .args(["tree", "-"])
        .write_stdin(r#"[{"id": "a|b", "value": 1}]"#)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a|b"), "stderr: {stderr}");

    cli()
        .args(["layout", "-"])
        .write_stdin("not json")
        .assert()
        .code(1);

    cli()
        .args(["layout", "--padding", "-5", "-"])
        .write_stdin(r#"[{"id": "solo", "value": 5}]"#)
        .assert()
        .code(1);
}

#[test]
fn usage_errors_exit_with_two() {
    cli().args(["related", "-"]).assert().code(2);
    cli().args(["layout", "--width"]).assert().code(2);
    cli().args(["--help"]).assert().code(2);
    cli()
        .args(["layout", "--width", "nan", "-"])
        .write_stdin(r#"[{"id": "solo", "value": 5}]"#)
        .assert()
        .code(2);
}
