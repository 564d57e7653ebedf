use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::controllers::{
    health,
    proxy::ProxyController,
    token::TokenController,
    twitter_api::TwitterApiController,
};
use crate::infrastructure::config::Config;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID wrapper type for extension
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware to generate and attach a request ID to each request
async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, header_value);
    }

    response
}

/// Build the application router with all routes configured
pub fn build_router(
    token_controller: Arc<TokenController>,
    proxy_controller: Arc<ProxyController>,
    twitter_api_controller: Arc<TwitterApiController>,
) -> Router {
    // Token exchange (public - the exchange itself is the authentication)
    let token_routes = Router::new()
        .route("/token-exchange", post(TokenController::exchange))
        .with_state(token_controller);

    // Raw relay to the Twitter REST API, any method
    let proxy_routes = Router::new()
        .route("/proxy", any(ProxyController::relay))
        .with_state(proxy_controller);

    // Convenience wrappers over common endpoints
    let api_routes = Router::new()
        .route("/api/me", get(TwitterApiController::get_me))
        .route(
            "/api/users/:user_id/tweets",
            get(TwitterApiController::get_user_tweets),
        )
        .route(
            "/api/tweets/:tweet_id/replies",
            get(TwitterApiController::get_tweet_replies),
        )
        .route("/api/tweets", post(TwitterApiController::post_tweet))
        .with_state(twitter_api_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .merge(token_routes)
        .merge(proxy_routes)
        .merge(api_routes)
        // Browser dashboards call this cross-origin; keep the surface
        // permissive.
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    token_controller: Arc<TokenController>,
    proxy_controller: Arc<ProxyController>,
    twitter_api_controller: Arc<TwitterApiController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(token_controller, proxy_controller, twitter_api_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
