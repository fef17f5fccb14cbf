use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn builds_document_from_pairs() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("form.json");
    write_file(&input, r#"[["foo[0].bar", "x"], ["title", "Hello"]]"#);

    let expected = "{\n  \"foo\": [\n    {\n      \"bar\": \"x\"\n    }\n  ],\n  \"title\": \"Hello\"\n}\n";

    cargo_bin_cmd!("formpath")
        .arg(&input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn reads_field_objects_from_stdin() {
    cargo_bin_cmd!("formpath")
        .args(["--indent", "0"])
        .write_stdin(
            r#"[
                {"name": "senses[TEMPLATE].definition", "value": "d"},
                {"name": "locked", "value": "yes", "disabled": true},
                {"name": "flags.active", "value": true}
            ]"#,
        )
        .assert()
        .success()
        .stdout("{\"senses\":[{\"definition\":\"d\"}],\"flags\":{\"active\":true}}\n");
}

#[test]
fn include_disabled_and_empty_flags() {
    let input = r#"[
        {"name": "a", "value": ""},
        {"name": "b", "value": "1", "disabled": true}
    ]"#;

    cargo_bin_cmd!("formpath")
        .args(["--indent", "0", "--include-disabled", "--no-include-empty"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("{\"b\":\"1\"}\n");
}

#[test]
fn malformed_fields_warn_on_stderr() {
    cargo_bin_cmd!("formpath")
        .args(["--indent", "0"])
        .write_stdin(r#"[["senses[1].gloss[en].lang", "en"], ["lemma", "run"]]"#)
        .assert()
        .success()
        .stdout("{\"lemma\":\"run\"}\n")
        .stderr(contains("WARN senses[1].gloss[en].lang: invalid array index"));
}

#[test]
fn strict_mode_fails() {
    cargo_bin_cmd!("formpath")
        .arg("--strict")
        .write_stdin(r#"[["bad[x]", "1"]]"#)
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("invalid array index")));
}

#[test]
fn custom_template_markers() {
    cargo_bin_cmd!("formpath")
        .args(["--indent", "0", "--template-marker", "NEW"])
        .write_stdin(r#"[["relations[NEW].target", "r"]]"#)
        .assert()
        .success()
        .stdout("{\"relations\":[{\"target\":\"r\"}]}\n");
}

#[test]
fn validate_reports_gaps_and_errors() {
    cargo_bin_cmd!("formpath")
        .args(["--validate", "--indent", "0"])
        .write_stdin(r#"[["items[0]", "a"], ["items[2]", "c"]]"#)
        .assert()
        .success()
        .stdout(contains("gap in `items` indices: missing 1"));

    cargo_bin_cmd!("formpath")
        .args(["--validate", "--indent", "0"])
        .write_stdin(r#"[["items[x]", "a"]]"#)
        .assert()
        .failure()
        .stdout(contains("\"success\":false"));
}

#[test]
fn bounded_matches_inline() {
    let input = r#"[["senses[1].gloss", "g1"], ["senses[0].gloss", "g0"]]"#;
    let expected = "{\"senses\":[{\"gloss\":\"g0\"},{\"gloss\":\"g1\"}]}\n";

    cargo_bin_cmd!("formpath")
        .args(["--indent", "0"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected);

    cargo_bin_cmd!("formpath")
        .args(["--indent", "0", "--bounded", "--timeout", "5000"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn writes_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("form.json");
    let output = dir.path().join("tree.json");
    write_file(&input, r#"[["a.b", "1"]]"#);

    cargo_bin_cmd!("formpath")
        .arg(&input)
        .args(["-o", output.to_str().expect("output path")])
        .args(["--indent", "0"])
        .assert()
        .success()
        .stdout("");

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(contents, "{\"a\":{\"b\":\"1\"}}\n");
}

#[test]
fn invalid_input_is_an_error() {
    cargo_bin_cmd!("formpath")
        .write_stdin("{\"not\": \"an array\"}")
        .assert()
        .failure()
        .stderr(contains("ERROR"));
}
