use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    infrastructure::twitter::{ProxyRequest, TwitterApiClient, UpstreamReply},
};

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub endpoint: Option<String>,
    pub params: Option<String>,
}

pub struct ProxyController {
    api_client: Arc<TwitterApiClient>,
}

impl ProxyController {
    pub fn new(api_client: Arc<TwitterApiClient>) -> Self {
        Self { api_client }
    }

    /// ANY /proxy?endpoint=<path>&params=<query> - Relay an authenticated
    /// call to the Twitter REST v2 API, mirroring status and body verbatim
    pub async fn relay(
        State(controller): State<Arc<ProxyController>>,
        method: Method,
        Query(query): Query<ProxyParams>,
        headers: HeaderMap,
        body: String,
    ) -> AppResult<Response> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or(AppError::AuthRequired)?;

        let endpoint = query
            .endpoint
            .filter(|e| !e.is_empty())
            .ok_or(AppError::Validation {
                missing: vec!["endpoint"],
            })?;

        let reply = controller
            .api_client
            .forward(ProxyRequest {
                method: method.clone(),
                endpoint,
                params: query.params,
                authorization,
                body: if body.is_empty() { None } else { Some(body) },
            })
            .await?;

        Ok(render_reply(reply))
    }
}

/// Relay the upstream status verbatim. A JSON body is re-emitted as JSON;
/// anything else is passed through as text with the upstream content type.
fn render_reply(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&reply.body) {
        return (status, Json(value)).into_response();
    }

    let content_type = reply
        .content_type
        .unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
    (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}
