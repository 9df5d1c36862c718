//! Integration tests for the `key` subcommands.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn smartreview(home: &Path, server_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("smartreview").unwrap();
    cmd.env("SMARTREVIEW_HOME", home)
        .env("SMARTREVIEW_SERVER_URL", server_url)
        .env("SMARTREVIEW_NO_BROWSER", "1");
    cmd
}

fn write_session(home: &Path) {
    fs::write(
        home.join("session.json"),
        r#"{"token": "tok-abcdefghijklmnop", "user": {"id": 1, "login": "octocat"}}"#,
    )
    .unwrap();
}

async fn mock_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "login": "octocat"})),
        )
        .mount(server)
        .await;
}

fn valid_key() -> String {
    format!("gsk_{}", "a".repeat(48))
}

/// Test: key commands require a signed-in session.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_requires_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    smartreview(temp.path(), &server.uri())
        .args(["key", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in first"));
}

/// Test: a malformed key is rejected before any network call.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_set_rejects_invalid_format() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/setup-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "set", "gsk_short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too short"));
}

/// Test: a well-formed key is stored and the follow-up hint printed.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_set_stores_key() {
    let key = valid_key();
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/setup-key"))
        .and(body_json(json!({"api_key": key})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "set", &key])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key saved successfully!"))
        .stdout(predicate::str::contains("smartreview install"));
}

/// Test: the prompted path reads the key from stdin.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_set_prompts_when_omitted() {
    let key = valid_key();
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/setup-key"))
        .and(body_json(json!({"api_key": key})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "set"])
        .write_stdin(format!("{key}\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("API key saved successfully!"));
}

/// Test: the server's error body reaches the user verbatim.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_set_surfaces_server_error() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/setup-key"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "API key is not active"})),
        )
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "set", &valid_key()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is not active"));
}

/// Test: key status reports a configured key.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_status_present() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/setup-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"has_api_key": true})))
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("An API key is configured."));
}

/// Test: delete with --yes removes the key.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_delete_confirmed() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/setup-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"has_api_key": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/setup-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "delete", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key deleted"));
}

/// Test: answering "n" at the prompt cancels without a delete call.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_delete_cancelled_at_prompt() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/setup-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"has_api_key": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/setup-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "delete"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete cancelled."));
}

/// Test: deleting a key the backend already lost is reported as benign.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_delete_missing_is_benign() {
    let server = MockServer::start().await;
    mock_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/setup-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"has_api_key": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/setup-key"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    write_session(temp.path());

    smartreview(temp.path(), &server.uri())
        .args(["key", "delete", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already removed"));
}
