use base64::Engine;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, Request, ResponseTemplate};

use crate::helpers::TestApp;

/// Matches requests that carry no Authorization header at all.
struct NoAuthorizationHeader;

impl wiremock::Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn exchange_body() -> serde_json::Value {
    json!({
        "code": "abc",
        "codeVerifier": "v1",
        "clientId": "cid",
        "redirectUri": "https://x/cb",
    })
}

fn token_json() -> serde_json::Value {
    json!({
        "access_token": "at-123",
        "token_type": "bearer",
        "expires_in": 7200,
        "scope": "tweet.read tweet.write",
        "refresh_token": "rt-456",
    })
}

#[tokio::test]
async fn it_should_send_the_exact_grant_form_for_public_clients() {
    let app = TestApp::spawn().await;

    // Public client: PKCE only, no Basic header, field order fixed.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "grant_type=authorization_code&client_id=cid&code=abc\
             &redirect_uri=https%3A%2F%2Fx%2Fcb&code_verifier=v1",
        ))
        .and(NoAuthorizationHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post("/token-exchange", &exchange_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["access_token"], "at-123");
    assert_eq!(body["refresh_token"], "rt-456");
}

#[tokio::test]
async fn it_should_send_basic_auth_for_confidential_clients() {
    let app = TestApp::spawn().await;

    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("cid:shh")
    );
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let mut body = exchange_body();
    body["clientSecret"] = json!("shh");
    let response = app.client.post("/token-exchange", &body).await.unwrap();

    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn it_should_reject_missing_fields_before_any_upstream_call() {
    let app = TestApp::spawn().await;

    // Nothing mounted and expect(0): any upstream call fails the test.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post("/token-exchange", &json!({ "code": "abc" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["code"], "validation_error");
    assert_eq!(
        body["missing"],
        json!(["codeVerifier", "clientId", "redirectUri"])
    );
}

#[tokio::test]
async fn it_should_treat_empty_strings_as_missing() {
    let app = TestApp::spawn().await;

    let mut body = exchange_body();
    body["codeVerifier"] = json!("");
    let response = app.client.post("/token-exchange", &body).await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["missing"], json!(["codeVerifier"]));
}

#[tokio::test]
async fn it_should_relay_upstream_error_status_and_body() {
    let app = TestApp::spawn().await;

    let upstream_error = r#"{"error":"invalid_request","error_description":"Value passed for the authorization code was invalid."}"#;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(upstream_error))
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post("/token-exchange", &exchange_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "Token exchange failed");
    assert_eq!(body["code"], "upstream_error");
    assert_eq!(body["status"], 400);
    assert_eq!(body["twitterError"], upstream_error);
}

#[tokio::test]
async fn it_should_flag_non_json_success_bodies_as_parse_errors() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post("/token-exchange", &exchange_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["code"], "parse_error");
    assert_eq!(body["rawResponse"], "<html>maintenance</html>");
}

#[tokio::test]
async fn it_should_default_token_type_when_upstream_omits_it() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-123",
            "expires_in": 7200,
            "scope": "tweet.read",
        })))
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post("/token-exchange", &exchange_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["token_type"], "bearer");
    // No refresh token from upstream means none in the relayed body.
    assert!(body.get("refresh_token").is_none());
}
