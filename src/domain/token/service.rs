use std::sync::Arc;

use crate::{
    error::AppResult,
    infrastructure::twitter::TwitterOAuthClient,
};

use super::{TokenExchangeRequest, TokenResponse};

pub struct TokenService {
    oauth_client: Arc<TwitterOAuthClient>,
}

impl TokenService {
    pub fn new(oauth_client: Arc<TwitterOAuthClient>) -> Self {
        Self { oauth_client }
    }

    /// Exchange an authorization code + PKCE verifier for a token pair.
    ///
    /// Invalid input fails before any upstream call is issued.
    pub async fn exchange(&self, request: TokenExchangeRequest) -> AppResult<TokenResponse> {
        let params = request.validate()?;

        // Log lengths and presence only, never the values themselves.
        tracing::info!(
            code_len = params.code.len(),
            verifier_len = params.code_verifier.len(),
            client_id_len = params.client_id.len(),
            redirect_uri = %params.redirect_uri,
            confidential = params.client_secret.is_some(),
            "Token exchange request"
        );

        let tokens = self.oauth_client.exchange_code(&params).await?;
        tracing::info!("Token exchange successful");
        Ok(tokens)
    }
}
