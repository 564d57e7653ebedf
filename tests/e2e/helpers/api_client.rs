use anyhow::Result;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Thin HTTP client for the spawned app. Auth arguments are full
/// `Authorization` header values, e.g. `"Bearer token"`.
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, path, None, None).await
    }

    pub async fn get_with_auth(&self, path: &str, auth: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, path, None, Some(auth)).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn post_with_auth<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        auth: &str,
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), Some(auth)).await
    }

    pub async fn request<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        auth: Option<&str>,
    ) -> Result<ApiResponse> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(auth) = auth {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response.bytes().await?.to_vec();
        let body = serde_json::from_slice(&body_bytes).ok();

        Ok(ApiResponse {
            status,
            headers,
            body_bytes,
            body,
        })
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body_bytes: Vec<u8>,
    /// Parsed body, when it was JSON.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "unexpected status; body: {}",
            String::from_utf8_lossy(&self.body_bytes)
        );
    }

    pub fn assert_header_exists(&self, name: &str) {
        assert!(
            self.headers.contains_key(name),
            "expected header {name} on response"
        );
    }

    pub fn json(&self) -> &Value {
        self.body.as_ref().unwrap_or_else(|| {
            panic!(
                "response body is not JSON: {}",
                String::from_utf8_lossy(&self.body_bytes)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).into_owned()
    }
}
