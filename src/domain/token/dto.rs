use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Body of `POST /token-exchange`. All fields optional at the wire level so
/// validation can report exactly which ones were absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_secret: Option<String>,
}

/// Validated exchange parameters. `client_secret` present means confidential
/// client (Basic auth); absent means public client (PKCE only).
#[derive(Debug, Clone)]
pub struct ExchangeParams {
    pub code: String,
    pub code_verifier: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub client_secret: Option<String>,
}

impl TokenExchangeRequest {
    /// Check the four required fields are present and non-empty. Returns a
    /// `Validation` error naming the absent fields, without echoing values.
    pub fn validate(self) -> AppResult<ExchangeParams> {
        fn present(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|s| !s.is_empty())
        }

        let mut missing = Vec::new();
        if !present(&self.code) {
            missing.push("code");
        }
        if !present(&self.code_verifier) {
            missing.push("codeVerifier");
        }
        if !present(&self.client_id) {
            missing.push("clientId");
        }
        if !present(&self.redirect_uri) {
            missing.push("redirectUri");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation { missing });
        }

        Ok(ExchangeParams {
            code: self.code.unwrap_or_default(),
            code_verifier: self.code_verifier.unwrap_or_default(),
            client_id: self.client_id.unwrap_or_default(),
            redirect_uri: self.redirect_uri.unwrap_or_default(),
            client_secret: self.client_secret.filter(|s| !s.is_empty()),
        })
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Token pair returned by the provider. Immutable once received; the caller
/// persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
