use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    infrastructure::twitter::TwitterApiClient,
};

#[derive(Debug, Deserialize)]
pub struct RepliesParams {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTweetRequest {
    pub text: Option<String>,
    pub reply_to_tweet_id: Option<String>,
}

/// Convenience wrappers over the REST client for the common dashboard
/// calls. All require the caller's `Authorization` header and relay
/// upstream errors the way the proxy does.
pub struct TwitterApiController {
    api_client: Arc<TwitterApiClient>,
}

impl TwitterApiController {
    pub fn new(api_client: Arc<TwitterApiClient>) -> Self {
        Self { api_client }
    }

    fn require_auth(headers: &HeaderMap) -> AppResult<String> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or(AppError::AuthRequired)
    }

    /// GET /api/me - Current user with public metrics
    pub async fn get_me(
        State(controller): State<Arc<TwitterApiController>>,
        headers: HeaderMap,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth = Self::require_auth(&headers)?;
        let user = controller.api_client.get_me(&auth).await?;
        Ok(Json(user))
    }

    /// GET /api/users/:user_id/tweets - Recent tweets; 429s come back with a
    /// retry hint instead of being retried here
    pub async fn get_user_tweets(
        State(controller): State<Arc<TwitterApiController>>,
        Path(user_id): Path<String>,
        headers: HeaderMap,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth = Self::require_auth(&headers)?;
        tracing::info!(%user_id, "Fetching tweets for user");
        let tweets = controller.api_client.get_user_tweets(&auth, &user_id).await?;
        Ok(Json(tweets))
    }

    /// GET /api/tweets/:tweet_id/replies?username= - Replies in a tweet's
    /// conversation, excluding the author
    pub async fn get_tweet_replies(
        State(controller): State<Arc<TwitterApiController>>,
        Path(tweet_id): Path<String>,
        Query(params): Query<RepliesParams>,
        headers: HeaderMap,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth = Self::require_auth(&headers)?;
        let username = params
            .username
            .filter(|u| !u.is_empty())
            .ok_or(AppError::Validation {
                missing: vec!["username"],
            })?;

        tracing::info!(%tweet_id, "Fetching replies for tweet");
        let replies = controller
            .api_client
            .get_tweet_replies(&auth, &tweet_id, &username)
            .await?;
        Ok(Json(replies))
    }

    /// POST /api/tweets - Post a tweet or a reply
    pub async fn post_tweet(
        State(controller): State<Arc<TwitterApiController>>,
        headers: HeaderMap,
        Json(request): Json<PostTweetRequest>,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth = Self::require_auth(&headers)?;
        let text = request
            .text
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Validation {
                missing: vec!["text"],
            })?;

        tracing::info!(
            text_len = text.len(),
            is_reply = request.reply_to_tweet_id.is_some(),
            "Posting tweet"
        );
        let posted = controller
            .api_client
            .post_tweet(&auth, &text, request.reply_to_tweet_id.as_deref())
            .await?;
        Ok(Json(posted))
    }
}
