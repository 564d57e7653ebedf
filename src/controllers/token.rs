use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::token::{TokenExchangeRequest, TokenResponse, TokenService},
    error::AppResult,
};

pub struct TokenController {
    token_service: Arc<TokenService>,
}

impl TokenController {
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }

    /// POST /token-exchange - Exchange an authorization code + PKCE verifier
    /// for an access/refresh token pair
    pub async fn exchange(
        State(controller): State<Arc<TokenController>>,
        Json(request): Json<TokenExchangeRequest>,
    ) -> AppResult<Json<TokenResponse>> {
        let tokens = controller.token_service.exchange(request).await?;
        Ok(Json(tokens))
    }
}
