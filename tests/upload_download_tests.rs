//! Upload and archive-download tests against a mock AppThwack server.

use serde_json::json;
use thwack_client::{ThwackApi, ThwackConfig, ThwackError, ValidationError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ThwackApi {
    let mut cfg = ThwackConfig::new("test-key").unwrap();
    cfg.domain = server.uri();
    ThwackApi::new(cfg).unwrap()
}

#[tokio::test]
async fn upload_sends_a_multipart_form_and_decodes_the_file_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file_id": 314})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app_path = dir.path().join("demo.apk");
    std::fs::write(&app_path, b"not really an apk").unwrap();

    let uploaded = api_for(&server).upload(&app_path, None).await.unwrap();
    assert_eq!(uploaded.file_id, 314);
    assert_eq!(uploaded.to_string(), "file/314");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    // The remote name defaults to the local filename.
    assert!(body.contains("demo.apk"));
    assert!(body.contains("not really an apk"));
}

#[tokio::test]
async fn upload_honors_an_explicit_remote_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file_id": 315})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app_path = dir.path().join("build-7712.apk");
    std::fs::write(&app_path, b"bytes").unwrap();

    api_for(&server)
        .upload(&app_path, Some("release-candidate.apk"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("release-candidate.apk"));
}

#[tokio::test]
async fn upload_without_extension_never_reaches_the_server() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let app_path = dir.path().join("demo");
    std::fs::write(&app_path, b"bytes").unwrap();

    let err = api_for(&server).upload(&app_path, None).await.unwrap_err();
    assert!(matches!(
        err,
        ThwackError::Validation(ValidationError::MissingExtension { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn download_writes_the_archive_bytes_unmodified() {
    // Deliberately non-UTF8 bytes, zip magic first.
    let archive: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0xff, 0x00, 0x7f, 0x10, 0x9c];

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "droid", "url": "droid"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/run/7/42"))
        .and(query_param("format", "archive"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(archive.clone(), "application/zip"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let run = api.project_by_id(7).await.unwrap().unwrap().run(42);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("results.zip");
    // Pre-existing content must be overwritten, not appended to.
    std::fs::write(&dest, b"stale archive from a previous run").unwrap();

    let written = run.download_to(&dest).await.unwrap();
    assert_eq!(written, archive.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), archive);
}

#[tokio::test]
async fn download_rejects_a_non_archive_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "droid", "url": "droid"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/run/7/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "not ready yet"})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let run = api.project_by_id(7).await.unwrap().unwrap().run(42);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("results.zip");
    let err = run.download_to(&dest).await.unwrap_err();
    assert!(matches!(err, ThwackError::Api(_)));
}
