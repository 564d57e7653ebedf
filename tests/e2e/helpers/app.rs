use std::sync::Arc;

use wiremock::MockServer;

use replybot_backend::controllers::proxy::ProxyController;
use replybot_backend::controllers::token::TokenController;
use replybot_backend::controllers::twitter_api::TwitterApiController;
use replybot_backend::domain::token::TokenService;
use replybot_backend::infrastructure::http::build_router;
use replybot_backend::infrastructure::twitter::{TwitterApiClient, TwitterOAuthClient};

use super::TestClient;

/// The app under test plus the wiremock server standing in for Twitter.
pub struct TestApp {
    pub client: TestClient,
    pub twitter: MockServer,
}

impl TestApp {
    /// Spawn the full router on an ephemeral port, pointed at a fresh mock
    /// Twitter server.
    pub async fn spawn() -> Self {
        let twitter = MockServer::start().await;

        let oauth_client = Arc::new(TwitterOAuthClient::new(format!(
            "{}/oauth2/token",
            twitter.uri()
        )));
        let api_client = Arc::new(TwitterApiClient::new(twitter.uri()));

        let token_controller = Arc::new(TokenController::new(Arc::new(TokenService::new(
            oauth_client,
        ))));
        let proxy_controller = Arc::new(ProxyController::new(api_client.clone()));
        let twitter_api_controller = Arc::new(TwitterApiController::new(api_client));

        let router = build_router(token_controller, proxy_controller, twitter_api_controller);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve test app");
        });

        Self {
            client: TestClient::new(&format!("http://{addr}")),
            twitter,
        }
    }
}
