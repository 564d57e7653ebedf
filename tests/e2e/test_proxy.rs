use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

use crate::helpers::TestApp;

const AUTH: &str = "Bearer user-token";

/// Matches requests with a completely empty body.
struct EmptyBody;

impl wiremock::Match for EmptyBody {
    fn matches(&self, request: &Request) -> bool {
        request.body.is_empty()
    }
}

#[tokio::test]
async fn it_should_require_an_authorization_header() {
    let app = TestApp::spawn().await;

    let response = app.client.get("/proxy?endpoint=users/me").await.unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], "auth_required");
}

#[tokio::test]
async fn it_should_require_the_endpoint_parameter() {
    let app = TestApp::spawn().await;

    let response = app.client.get_with_auth("/proxy", AUTH).await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["missing"], json!(["endpoint"]));
}

#[tokio::test]
async fn it_should_forward_gets_without_a_body_and_relay_json() {
    let app = TestApp::spawn().await;

    let user = json!({ "data": { "id": "1", "username": "alice" } });
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(query_param("user.fields", "public_metrics"))
        .and(EmptyBody)
        .and(wiremock::matchers::header("authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(user.clone()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth(
            "/proxy?endpoint=users/me&params=user.fields%3Dpublic_metrics",
            AUTH,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &user);
}

#[tokio::test]
async fn it_should_forward_post_bodies_unmodified() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/tweets"))
        .and(body_json(json!({ "text": "hello world" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "9" } })),
        )
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post_with_auth(
            "/proxy?endpoint=tweets",
            &json!({ "text": "hello world" }),
            AUTH,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json()["data"]["id"], "9");
}

#[tokio::test]
async fn it_should_relay_non_json_upstream_responses_verbatim() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(418).set_body_string("short and stout"))
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth("/proxy?endpoint=users/me", AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::IM_A_TEAPOT);
    assert_eq!(response.text(), "short and stout");
}

#[tokio::test]
async fn it_should_relay_upstream_error_statuses_without_wrapping() {
    let app = TestApp::spawn().await;

    let upstream = json!({ "title": "Unauthorized", "status": 401 });
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(upstream.clone()))
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth("/proxy?endpoint=users/me", AUTH)
        .await
        .unwrap();

    // The upstream body comes through untouched, not rewrapped in our
    // error envelope.
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json(), &upstream);
}

#[tokio::test]
async fn it_should_forward_delete_requests() {
    let app = TestApp::spawn().await;

    Mock::given(method("DELETE"))
        .and(path("/tweets/9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "deleted": true } })),
        )
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .request::<()>(Method::DELETE, "/proxy?endpoint=tweets/9", None, Some(AUTH))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json()["data"]["deleted"], true);
}

#[tokio::test]
async fn it_should_handle_concurrent_relays_independently() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "1" } })),
        )
        .expect(8)
        .mount(&app.twitter)
        .await;

    let calls = (0..8).map(|_| app.client.get_with_auth("/proxy?endpoint=users/me", AUTH));
    for response in futures::future::join_all(calls).await {
        response.unwrap().assert_status(StatusCode::OK);
    }
}
