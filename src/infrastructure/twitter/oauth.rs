use crate::domain::token::{ExchangeParams, TokenResponse};
use crate::error::{AppError, AppResult};

const CONFIDENTIAL_HINT: &str =
    "Request used confidential-client Basic auth; check the app is configured as confidential";
const PUBLIC_HINT: &str =
    "Request used PKCE only; check the app is configured as a public client";

pub struct TwitterOAuthClient {
    token_url: String,
    http_client: reqwest::Client,
}

impl TwitterOAuthClient {
    pub fn new(token_url: String) -> Self {
        Self {
            token_url,
            http_client: reqwest::Client::new(),
        }
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// Confidential clients (secret present) authenticate with an HTTP Basic
    /// header of `clientId:clientSecret`; public clients rely on PKCE alone
    /// and carry no auth header.
    pub async fn exchange_code(&self, params: &ExchangeParams) -> AppResult<TokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", params.client_id.as_str()),
            ("code", params.code.as_str()),
            ("redirect_uri", params.redirect_uri.as_str()),
            ("code_verifier", params.code_verifier.as_str()),
        ];

        let mut request = self.http_client.post(&self.token_url).form(&form);
        if let Some(secret) = &params.client_secret {
            request = request.basic_auth(&params.client_id, Some(secret));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Twitter token exchange failed");
            let hint = if params.client_secret.is_some() {
                CONFIDENTIAL_HINT
            } else {
                PUBLIC_HINT
            };
            return Err(AppError::Upstream {
                label: "Token exchange failed",
                status: status.as_u16(),
                body,
                hint: Some(hint),
            });
        }

        serde_json::from_str(&body).map_err(|_| AppError::Parse { raw: body })
    }
}
