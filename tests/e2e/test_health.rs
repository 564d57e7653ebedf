use pretty_assertions::assert_eq;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn it_should_return_ok_for_health_check() {
    let app = TestApp::spawn().await;

    let response = app.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn it_should_return_ready_status() {
    let app = TestApp::spawn().await;

    let response = app.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json().get("status").and_then(|v| v.as_str()),
        Some("ready")
    );
}

#[tokio::test]
async fn it_should_include_request_id_in_responses() {
    let app = TestApp::spawn().await;

    let response = app.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = app.client.get("/health/ready").await.unwrap();
    response.assert_header_exists("x-request-id");
}
