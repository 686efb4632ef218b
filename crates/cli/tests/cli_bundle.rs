use assert_cmd::Command;
use casebundle_bundle::blank_pdf;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn casebundle() -> Command {
    let mut cmd = Command::cargo_bin("casebundle").expect("binary");
    cmd.env_remove("CASEBUNDLE_FETCH_CONCURRENCY")
        .env_remove("CASEBUNDLE_FETCH_TIMEOUT_MS")
        .env_remove("CASEBUNDLE_FETCH_RETRY_BACKOFF_MS")
        .arg("--quiet");
    cmd
}

fn setup_drive(docs: &[(&str, &str, usize)]) -> TempDir {
    let temp = tempdir().unwrap();
    for (system, id, pages) in docs {
        let dir = temp.path().join(system);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{id}.pdf")), blank_pdf(*pages).unwrap()).unwrap();
    }
    temp
}

fn write_request(dir: &Path, request: Value) -> String {
    let path = dir.join("request.json");
    fs::write(&path, request.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json on stdout")
}

#[test]
fn bundle_from_shared_drive() {
    let drive = setup_drive(&[("criminal", "1", 2), ("criminal", "2", 3)]);
    let request = write_request(
        drive.path(),
        json!({
            "caseId": "CASE-7",
            "documents": [
                {"sourceSystem": "criminal", "documentId": "1"},
                {"sourceSystem": "criminal", "documentId": "2"}
            ]
        }),
    );
    let pdf_out = drive.path().join("bundle.pdf");

    let output = casebundle()
        .arg("bundle")
        .arg("--request")
        .arg(&request)
        .arg("--source-dir")
        .arg(drive.path())
        .arg("--pdf-out")
        .arg(&pdf_out)
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    assert_eq!(body["status"], "succeeded");
    assert_eq!(
        body["pageRanges"],
        json!([{"start": 1, "end": 2}, {"start": 3, "end": 5}])
    );
    assert_eq!(body["stats"]["totalPages"], 5);
    assert!(fs::read(&pdf_out).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn missing_document_is_reported_as_warning() {
    let drive = setup_drive(&[("civil", "a", 1)]);
    let request = write_request(
        drive.path(),
        json!({
            "caseId": "CASE-8",
            "documents": [
                {"sourceSystem": "civil", "documentId": "a"},
                {"sourceSystem": "civil", "documentId": "gone"}
            ]
        }),
    );

    let output = casebundle()
        .args(["bundle", "--request", request.as_str(), "--source-dir"])
        .arg(drive.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["warnings"][0]["documentId"], "gone");
    assert_eq!(body["warnings"][0]["errorKind"], "not_found");
}

#[test]
fn all_documents_failing_exits_with_code_two() {
    let drive = setup_drive(&[]);
    let request = write_request(
        drive.path(),
        json!({
            "caseId": "CASE-9",
            "documents": [{"sourceSystem": "dars", "documentId": "x"}]
        }),
    );

    let output = casebundle()
        .args(["bundle", "--request", request.as_str(), "--source-dir"])
        .arg(drive.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let body = stdout_json(&output);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["base64Pdf"], "");
    assert!(body["message"].is_string());
}

#[test]
fn empty_request_prints_error_envelope() {
    let drive = setup_drive(&[]);
    let request = write_request(drive.path(), json!({"caseId": "CASE-0", "documents": []}));

    let output = casebundle()
        .args(["bundle", "--request", request.as_str(), "--source-dir"])
        .arg(drive.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let body = stdout_json(&output);
    assert_eq!(body["code"], "empty_request");
    assert!(body["hint"].is_string());
}

#[test]
fn invalid_config_is_rejected() {
    let drive = setup_drive(&[("civil", "a", 1)]);
    let request = write_request(
        drive.path(),
        json!({"caseId": "C", "documents": [{"sourceSystem": "civil", "documentId": "a"}]}),
    );
    let config = drive.path().join("casebundle.toml");
    fs::write(&config, "[fetch]\ntimeout_ms = 0\n").unwrap();

    let output = casebundle()
        .arg("--config")
        .arg(&config)
        .args(["bundle", "--request", request.as_str(), "--source-dir"])
        .arg(drive.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["code"], "invalid_config");
}

#[test]
fn bundle_requires_a_document_source() {
    casebundle()
        .args(["bundle", "--request", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source-dir"));
}

#[test]
fn key_documents_from_stdin() {
    let request = json!({
        "caseId": "98765",
        "documents": [
            {"sourceSystem": "criminal", "documentId": "1", "category": "ROP", "issueDate": "2023-01-01"},
            {"sourceSystem": "criminal", "documentId": "2", "category": "BAIL",
             "dispositionDescription": "Perfected", "issueDate": "2023-01-01"},
            {"sourceSystem": "criminal", "documentId": "3", "category": "BAIL",
             "dispositionDescription": "PERFECTED", "issueDate": "2023-06-01"},
            {"sourceSystem": "criminal", "documentId": "4", "category": "OTHER", "issueDate": "2023-07-01"}
        ]
    });

    let output = casebundle()
        .arg("key-documents")
        .write_stdin(request.to_string())
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    let ids: Vec<&str> = body["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["documentId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(body["bailDocumentId"], "3");
    assert_eq!(body["documents"][0]["category"], "ROP");
}

#[test]
fn classify_prints_canonical_label() {
    casebundle()
        .args(["classify", "--category", "  record of   proceedings "])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""category": "ROP""#));

    casebundle()
        .args(["classify", "--category", "misc", "--classification", "Bail Order"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""category": "BAIL""#));

    casebundle()
        .args(["classify", "--category", "misc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""known": false"#));
}

#[test]
fn schema_describes_request_fields() {
    casebundle()
        .args(["schema", "request"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keyDocumentsOnly"));
}
