use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

const AUTH: &str = "Bearer user-token";

#[tokio::test]
async fn it_should_fetch_the_current_user_with_metrics() {
    let app = TestApp::spawn().await;

    let user = json!({
        "data": {
            "id": "1",
            "username": "alice",
            "public_metrics": { "followers_count": 42 }
        }
    });
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(query_param(
            "user.fields",
            "public_metrics,profile_image_url",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(user.clone()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app.client.get_with_auth("/api/me", AUTH).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &user);
}

#[tokio::test]
async fn it_should_require_auth_on_every_api_route() {
    let app = TestApp::spawn().await;

    for (path, is_post) in [
        ("/api/me", false),
        ("/api/users/1/tweets", false),
        ("/api/tweets/9/replies?username=alice", false),
        ("/api/tweets", true),
    ] {
        let response = if is_post {
            app.client.post(path, &json!({ "text": "hi" })).await.unwrap()
        } else {
            app.client.get(path).await.unwrap()
        };
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json()["code"], "auth_required", "route {path}");
    }
}

#[tokio::test]
async fn it_should_fetch_recent_tweets_for_a_user() {
    let app = TestApp::spawn().await;

    let tweets = json!({ "data": [{ "id": "10", "text": "first" }] });
    Mock::given(method("GET"))
        .and(path("/users/1/tweets"))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets.clone()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth("/api/users/1/tweets", AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &tweets);
}

#[tokio::test]
async fn it_should_wrap_rate_limits_with_a_retry_hint() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/users/1/tweets"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-rate-limit-reset", "1700000000")
                .set_body_json(json!({ "title": "Too Many Requests" })),
        )
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth("/api/users/1/tweets", AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body = response.json();
    assert_eq!(body["code"], "rate_limited");
    assert_eq!(body["retryAfter"], "1700000000");
    assert!(body["suggestion"].as_str().unwrap().contains("15 minutes"));
}

#[tokio::test]
async fn it_should_search_replies_excluding_the_author() {
    let app = TestApp::spawn().await;

    let replies = json!({ "data": [{ "id": "11", "text": "nice one" }] });
    Mock::given(method("GET"))
        .and(path("/tweets/search/recent"))
        .and(query_param("query", "conversation_id:9 -from:alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(replies.clone()))
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .get_with_auth("/api/tweets/9/replies?username=alice", AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &replies);
}

#[tokio::test]
async fn it_should_require_username_when_listing_replies() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get_with_auth("/api/tweets/9/replies", AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["missing"], json!(["username"]));
}

#[tokio::test]
async fn it_should_post_a_reply_with_the_v2_reply_object() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/tweets"))
        .and(body_json(json!({
            "text": "thanks!",
            "reply": { "in_reply_to_tweet_id": "9" }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": { "id": "12", "text": "thanks!" } })),
        )
        .expect(1)
        .mount(&app.twitter)
        .await;

    let response = app
        .client
        .post_with_auth(
            "/api/tweets",
            &json!({ "text": "thanks!", "replyToTweetId": "9" }),
            AUTH,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json()["data"]["id"], "12");
}

#[tokio::test]
async fn it_should_require_text_when_posting() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post_with_auth("/api/tweets", &json!({ "replyToTweetId": "9" }), AUTH)
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["missing"], json!(["text"]));
}
