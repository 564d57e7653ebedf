use reqwest::Method;
use serde_json::json;

use crate::error::{AppError, AppResult};

const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// A request to relay to the Twitter REST v2 API.
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path under the API base, e.g. `users/me`
    pub endpoint: String,
    /// Raw query string appended verbatim, e.g. `max_results=10`
    pub params: Option<String>,
    /// Caller's `Authorization` header, forwarded as-is
    pub authorization: String,
    /// Body for non-GET methods, forwarded unmodified
    pub body: Option<String>,
}

/// Verbatim upstream reply: status, content type and raw body.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Stateless request translator between callers and the Twitter REST v2 API.
/// No shared mutable state; safe under unlimited concurrency.
pub struct TwitterApiClient {
    api_base: String,
    http_client: reqwest::Client,
}

impl TwitterApiClient {
    pub fn new(api_base: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint_url(&self, endpoint: &str, params: Option<&str>) -> String {
        let path = endpoint.trim_start_matches('/');
        match params {
            Some(q) if !q.is_empty() => format!("{}/{}?{}", self.api_base, path, q),
            _ => format!("{}/{}", self.api_base, path),
        }
    }

    /// Forward a request and relay the upstream status and body verbatim.
    /// Fails only on transport-level errors; upstream error statuses are
    /// relayed, not raised.
    pub async fn forward(&self, request: ProxyRequest) -> AppResult<UpstreamReply> {
        let url = self.endpoint_url(&request.endpoint, request.params.as_deref());
        tracing::debug!(method = %request.method, %url, "Proxying request to Twitter API");

        let is_get = request.method == Method::GET;
        let mut upstream = self
            .http_client
            .request(request.method, &url)
            .header("Authorization", &request.authorization)
            .header("Content-Type", "application/json");

        // GET never carries a body
        if !is_get {
            if let Some(body) = request.body {
                upstream = upstream.body(body);
            }
        }

        let response = upstream.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.text().await?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }

    async fn get_json(&self, authorization: &str, url: String) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RATE_LIMIT_RESET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.text().await?;

        if status.as_u16() == 429 {
            tracing::warn!(%url, "Twitter API rate limit hit");
            return Err(AppError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(AppError::Upstream {
                label: "Twitter API error",
                status: status.as_u16(),
                body,
                hint: None,
            });
        }

        serde_json::from_str(&body).map_err(|_| AppError::Parse { raw: body })
    }

    /// `GET /2/users/me` with public metrics and avatar.
    pub async fn get_me(&self, authorization: &str) -> AppResult<serde_json::Value> {
        let url = self.endpoint_url(
            "users/me",
            Some("user.fields=public_metrics,profile_image_url"),
        );
        self.get_json(authorization, url).await
    }

    /// Recent tweets for a user id.
    pub async fn get_user_tweets(
        &self,
        authorization: &str,
        user_id: &str,
    ) -> AppResult<serde_json::Value> {
        let url = self.endpoint_url(
            &format!("users/{user_id}/tweets"),
            Some("max_results=10&tweet.fields=created_at,public_metrics&expansions=author_id"),
        );
        self.get_json(authorization, url).await
    }

    /// Replies to a tweet: recent search on the conversation id, excluding
    /// the original author.
    pub async fn get_tweet_replies(
        &self,
        authorization: &str,
        tweet_id: &str,
        username: &str,
    ) -> AppResult<serde_json::Value> {
        let query = urlencoding::encode(&format!("conversation_id:{tweet_id} -from:{username}"))
            .into_owned();
        let url = self.endpoint_url(
            "tweets/search/recent",
            Some(&format!(
                "query={query}&max_results=10&tweet.fields=created_at,author_id,public_metrics&expansions=author_id"
            )),
        );
        self.get_json(authorization, url).await
    }

    /// Post a tweet, optionally as a reply.
    pub async fn post_tweet(
        &self,
        authorization: &str,
        text: &str,
        reply_to_tweet_id: Option<&str>,
    ) -> AppResult<serde_json::Value> {
        let mut body = json!({ "text": text });
        if let Some(id) = reply_to_tweet_id {
            body["reply"] = json!({ "in_reply_to_tweet_id": id });
        }

        let response = self
            .http_client
            .post(self.endpoint_url("tweets", None))
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Upstream {
                label: "Twitter API error",
                status: status.as_u16(),
                body: raw,
                hint: None,
            });
        }

        serde_json::from_str(&raw).map_err(|_| AppError::Parse { raw })
    }
}
