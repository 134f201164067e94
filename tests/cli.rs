//! CLI behaviour against a mocked model service.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("legal_classifier").unwrap();
    for key in [
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "CLASSIFIER_MODEL",
        "CLASSIFIER_API",
        "CLASSIFIER_DEFINITIONS",
        "CLASSIFIER_STRICT_SUBCATEGORY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn document(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn answer(category: &str, subcategory: &str) -> serde_json::Value {
    let text = json!({ "category": category, "subcategory": subcategory }).to_string();
    json!({ "output": [{ "type": "message", "content": [{ "type": "output_text", "text": text }] }] })
}

async fn mock_service(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_document.txt");

    cli()
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error reading").and(predicate::str::contains("no_such_document.txt")));
}

#[test]
fn test_requires_path_argument() {
    cli().assert().failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_prints_category_and_subcategory() {
    let server = mock_service(answer("Contract", "NDA")).await;
    let doc = document("MUTUAL NON-DISCLOSURE AGREEMENT");
    let base_url = format!("{}/v1", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        cli()
            .arg(doc.path())
            .env("OPENAI_API_KEY", "sk-test")
            .env("OPENAI_BASE_URL", base_url)
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout("Category   : Contract\nSubcategory: NDA\n");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4.1-2025-04-14");
    assert_eq!(body["input"][1]["content"], "MUTUAL NON-DISCLOSURE AGREEMENT");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_off_schema_answer_warns_and_fails() {
    let server = mock_service(answer("Patent", "Claim")).await;
    let doc = document("What is claimed is...");
    let base_url = format!("{}/v1", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        cli()
            .arg(doc.path())
            .env("OPENAI_API_KEY", "sk-test")
            .env("OPENAI_BASE_URL", base_url)
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to validate LLM response"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_strict_flag_rejects_unlisted_subcategory() {
    let server = mock_service(answer("Contract", "Haiku")).await;
    let doc = document("Roses are red");
    let base_url = format!("{}/v1", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        cli()
            .arg(doc.path())
            .arg("--strict")
            .env("OPENAI_API_KEY", "sk-test")
            .env("OPENAI_BASE_URL", base_url)
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("Haiku"));
}

#[test]
fn test_missing_api_key_is_an_error() {
    let doc = document("text");
    cli()
        .arg(doc.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_malformed_definitions_are_fatal() {
    let defs = document(r#"{"context_types": {"Contract": "x"}}"#);
    let doc = document("text");
    cli()
        .arg(doc.path())
        .arg("--definitions")
        .arg(defs.path())
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("taxonomy"));
}
