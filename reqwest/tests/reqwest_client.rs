//! Tests for the reqwest transport against a wiremock server

#![allow(clippy::unwrap_used, clippy::expect_used)] // Tests can unwrap

use composable_request_core::{
    ContentType, GlobalConfig, HttpClient, HttpMethod, HttpRequest, RequestBody,
    RequestDescription, RequestOptions, TransportError,
};
use composable_request_reqwest::ReqwestClient;
use composable_request_runtime::RequestController;
use composable_request_testing::HookRecorder;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{
    body_json, body_string, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(method: HttpMethod, url: String, body: Option<RequestBody>) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![("x-test".to_string(), "1".to_string())],
        body,
    }
}

#[tokio::test]
async fn test_get_sends_headers_and_parses_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(header("x-test", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = ReqwestClient::new()
        .execute(request(
            HttpMethod::Get,
            format!("{}/users?page=2", server.uri()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"code": 0, "data": []}));
}

#[tokio::test]
async fn test_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(json!({"a": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let response = ReqwestClient::new()
        .execute(request(
            HttpMethod::Post,
            format!("{}/items", server.uri()),
            Some(RequestBody::Json(json!({"a": 1}))),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn test_url_encoded_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("a=1&b=two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    ReqwestClient::new()
        .execute(request(
            HttpMethod::Put,
            server.uri(),
            Some(RequestBody::UrlEncoded("a=1&b=two".to_string())),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_form_data_object_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    ReqwestClient::new()
        .execute(request(
            HttpMethod::Post,
            server.uri(),
            Some(RequestBody::FormData(json!({"title": "hello", "count": 2}))),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let error = ReqwestClient::new()
        .execute(request(HttpMethod::Get, server.uri(), None))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        TransportError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    );
}

#[tokio::test]
async fn test_non_json_body_is_kept_as_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let response = ReqwestClient::new()
        .execute(request(HttpMethod::Get, server.uri(), None))
        .await
        .unwrap();

    assert_eq!(response.body, json!("pong"));
}

#[tokio::test]
async fn test_unreachable_host_is_request_failed() {
    let error = ReqwestClient::new()
        .execute(request(HttpMethod::Get, "http://127.0.0.1:9/".to_string(), None))
        .await
        .unwrap_err();

    assert!(matches!(error, TransportError::RequestFailed(_)));
}

#[tokio::test]
async fn test_controller_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_string_contains("q=rust"))
        .and(body_string_contains("page=1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": ["a", "b"]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fail"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let hooks = HookRecorder::new();
    let config = hooks.install(
        GlobalConfig::new()
            .with_default_options(RequestOptions::new().with_base_url(server.uri()))
            .with_format_response(|response| response.body["data"].clone()),
    );
    let controller = RequestController::new(Arc::new(ReqwestClient::new()), config);

    let search = controller.request::<Vec<String>>(
        RequestDescription::new("/api/search")
            .with_method(HttpMethod::Post)
            .with_content_type(ContentType::UrlEncoded)
            .with_data("q", "rust")
            .with_data("page", 1)
            .with_trigger(false),
    );
    search.trigger(None).await.unwrap();
    assert_eq!(
        search.view_state().await.data,
        Some(vec!["a".to_string(), "b".to_string()])
    );

    let failing = controller.request::<Value>(RequestDescription::new("/api/fail"));
    assert!(failing.trigger(None).await.is_err());
    assert!(failing.view_state().await.error);
    assert_eq!(hooks.transport_errors().len(), 1);
}
