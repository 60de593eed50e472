//! HTTP contract tests against a mock AppThwack server.

use serde_json::json;
use thwack_client::{ApiError, ProjectKind, ThwackApi, ThwackConfig, ThwackError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ThwackApi {
    let mut cfg = ThwackConfig::new("test-key").unwrap();
    cfg.domain = server.uri();
    ThwackApi::new(cfg).unwrap()
}

#[tokio::test]
async fn projects_are_listed_with_platform_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        // Basic auth: api key as username, empty password ("test-key:").
        .and(header("authorization", "Basic dGVzdC1rZXk6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "droid", "url": "droid", "project_type_id": 1},
            {"id": 2, "name": "site", "url": "site", "project_type_id": 2},
            {"id": 3, "name": "phone", "url": "phone", "project_type_id": 3},
            {"id": 4, "name": "legacy", "url": "legacy"}
        ])))
        .mount(&server)
        .await;

    let projects = api_for(&server).projects().await.unwrap();
    assert_eq!(projects.len(), 4);
    assert_eq!(projects[0].kind, ProjectKind::Android);
    assert_eq!(projects[1].kind, ProjectKind::Web);
    assert_eq!(projects[2].kind, ProjectKind::Ios);
    // No project_type_id means Android.
    assert_eq!(projects[3].kind, ProjectKind::Android);
}

#[tokio::test]
async fn lookup_by_id_and_name_filter_the_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "droid", "url": "droid"},
            {"id": 2, "name": "site", "url": "site", "project_type_id": 2}
        ])))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(api.project_by_id(2).await.unwrap().unwrap().name, "site");
    assert_eq!(api.project_by_name("droid").await.unwrap().unwrap().id, 1);
    assert!(api.project_by_name("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn device_pools_are_fetched_per_project() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "droid", "url": "droid"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devicepool/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Top 10 devices"},
            {"id": 11, "name": "Tablets"}
        ])))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let project = api.project_by_id(7).await.unwrap().unwrap();
    let pools = project.device_pools().await.unwrap();
    assert_eq!(pools.len(), 2);

    let tablets = project.device_pool_by_name("Tablets").await.unwrap();
    assert_eq!(tablets.unwrap().id, 11);
    assert!(project.device_pool_by_id(99).await.unwrap().is_none());
}

#[tokio::test]
async fn unexpected_status_is_an_api_error_not_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("{\"message\": \"no such resource\"}"),
        )
        .mount(&server)
        .await;

    let err = api_for(&server).projects().await.unwrap_err();
    match err {
        ThwackError::Api(ApiError::UnexpectedStatus {
            expected,
            actual,
            body,
        }) => {
            assert_eq!(expected, 200);
            assert_eq!(actual, 404);
            assert!(body.contains("no such resource"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_json_content_type_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let err = api_for(&server).projects().await.unwrap_err();
    match err {
        ThwackError::Api(ApiError::UnexpectedContentType {
            expected, actual, ..
        }) => {
            assert_eq!(expected, "application/json");
            assert_eq!(actual.as_deref(), Some("text/html"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn run_status_returns_the_vendor_string_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "droid", "url": "droid"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/run/7/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let project = api.project_by_id(7).await.unwrap().unwrap();
    let run = project.run(42);
    assert_eq!(run.status().await.unwrap(), "running");
}

#[tokio::test]
async fn run_results_decode_summary_and_breakdowns() {
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
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": {
                "id": 42,
                "status": "completed",
                "name": "nightly",
                "initiator": "ci@example.com",
                "result": "30 passed"
            },
            "failures_by_device": {"Nexus 4": []},
            "warnings_by_type": {"anr": 1}
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let run = api.project_by_id(7).await.unwrap().unwrap().run(42);
    let results = run.results().await.unwrap();
    assert_eq!(results.summary.status, "completed");
    assert!(results.failures_by_device.is_some());
    assert!(results.failures_by_job.is_none());
    assert!(results.warnings_by_type.is_some());
}

#[tokio::test]
async fn cancel_issues_a_put_and_returns_the_ack() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "droid", "url": "droid"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/run/7/42/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let run = api.project_by_id(7).await.unwrap().unwrap().run(42);
    let ack = run.cancel().await.unwrap();
    assert_eq!(ack["success"], json!(true));
}
