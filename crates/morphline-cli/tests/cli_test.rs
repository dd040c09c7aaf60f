use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const LINES: &str = r##"
morphlines:
  - id: lines
    commands:
      - readLine:
          commentPrefix: "#"
      - generateUUID:
          prefix: "doc-"
      - loadDocuments:
          batchSize: 2
  - id: strict
    commands:
      - readLine: {}
      - loadDocuments: {}
"##;

fn write_document(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("morphline.yaml");
    std::fs::write(&path, LINES).unwrap();
    path
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_check_valid_document() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());

    cargo_bin_cmd!("morphline")
        .args(["check", document.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Morphline 'lines' is valid"));

    cargo_bin_cmd!("morphline")
        .args(["check", document.to_str().unwrap(), "--id", "strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Morphline 'strict' is valid"));
}

#[test]
fn test_check_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());

    cargo_bin_cmd!("morphline")
        .args(["check", document.to_str().unwrap(), "--id", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Morphline id 'missing' not found"));
}

#[test]
fn test_check_unknown_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("bad.yaml");
    std::fs::write(&document, "morphlines:\n  - commands:\n      - frobnicate: {}\n").unwrap();

    cargo_bin_cmd!("morphline")
        .args(["check", document.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_run_prints_loaded_documents() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let input = dir.path().join("input.log");
    std::fs::write(&input, "first\n# skipped\n\nsecond\nthird\n").unwrap();

    let output = cargo_bin_cmd!("morphline")
        .args([
            "run",
            document.to_str().unwrap(),
            input.to_str().unwrap(),
            "--charset",
            "utf-8",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["message"][0], "first");
    assert_eq!(lines[1]["message"][0], "second");
    assert_eq!(lines[2]["message"][0], "third");
    assert!(lines[0]["id"][0].as_str().unwrap().starts_with("doc-"));
    assert!(lines[0].get("_attachment_body").is_none());
}

#[test]
fn test_run_walks_directories() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let inputs = dir.path().join("inputs");
    std::fs::create_dir_all(&inputs).unwrap();
    std::fs::write(inputs.join("b.log"), "from b\n").unwrap();
    std::fs::write(inputs.join("a.log"), "from a\n").unwrap();

    let output = cargo_bin_cmd!("morphline")
        .args([
            "run",
            document.to_str().unwrap(),
            inputs.to_str().unwrap(),
            "--charset",
            "utf-8",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["message"][0], "from a");
    assert_eq!(lines[1]["message"][0], "from b");
}

#[test]
fn test_run_missing_charset_fails_outside_production() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let input = dir.path().join("input.log");
    std::fs::write(&input, "line\n").unwrap();

    cargo_bin_cmd!("morphline")
        .args([
            "run",
            document.to_str().unwrap(),
            input.to_str().unwrap(),
            "--id",
            "strict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing charset"));

    cargo_bin_cmd!("morphline")
        .args([
            "run",
            document.to_str().unwrap(),
            input.to_str().unwrap(),
            "--id",
            "strict",
            "--production",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_run_with_override_document() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let overrides = dir.path().join("override.yaml");
    std::fs::write(
        &overrides,
        "morphlines:\n  - id: upper\n    commands:\n      - readLine: {charset: utf-8}\n      - loadDocuments: {}\n",
    )
    .unwrap();
    let input = dir.path().join("input.log");
    std::fs::write(&input, "only\n").unwrap();

    let output = cargo_bin_cmd!("morphline")
        .args([
            "run",
            document.to_str().unwrap(),
            input.to_str().unwrap(),
            "--override",
            overrides.to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"][0], "only");
}
