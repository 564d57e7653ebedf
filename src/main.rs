use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replybot_backend::controllers::proxy::ProxyController;
use replybot_backend::controllers::token::TokenController;
use replybot_backend::controllers::twitter_api::TwitterApiController;
use replybot_backend::domain::bot::BotService;
use replybot_backend::domain::reply;
use replybot_backend::domain::token::TokenService;
use replybot_backend::infrastructure::browser::{BrowserConfig, BrowserSession};
use replybot_backend::infrastructure::config::{AuthStrategy, Config, LogFormat};
use replybot_backend::infrastructure::http::start_http_server;
use replybot_backend::infrastructure::twitter::{TwitterApiClient, TwitterOAuthClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    match config.auth_strategy {
        AuthStrategy::Oauth => run_oauth_server(config).await,
        AuthStrategy::Browser => run_browser_bot(config).await,
    }
}

/// OAuth strategy: serve the token-exchange and API proxy endpoints.
async fn run_oauth_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting replybot backend (oauth strategy) on {}:{}",
        config.host,
        config.port
    );

    let config = Arc::new(config);

    let oauth_client = Arc::new(TwitterOAuthClient::new(config.twitter_token_url.clone()));
    let api_client = Arc::new(TwitterApiClient::new(config.twitter_api_base.clone()));

    let token_service = Arc::new(TokenService::new(oauth_client));

    let token_controller = Arc::new(TokenController::new(token_service));
    let proxy_controller = Arc::new(ProxyController::new(api_client.clone()));
    let twitter_api_controller = Arc::new(TwitterApiController::new(api_client));

    start_http_server(
        config,
        token_controller,
        proxy_controller,
        twitter_api_controller,
    )
    .await
}

/// Browser strategy: log in through the web UI and run the auto-reply loop
/// until Ctrl-C.
async fn run_browser_bot(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let username = config
        .twitter_username
        .clone()
        .ok_or("TWITTER_USERNAME is required for the browser strategy")?;
    let password = config
        .twitter_password
        .clone()
        .ok_or("TWITTER_PASSWORD is required for the browser strategy")?;

    tracing::info!(%username, headless = config.headless, "Starting replybot (browser strategy)");

    let session = Arc::new(
        BrowserSession::launch(BrowserConfig {
            headless: config.headless,
            cookie_file: config.cookie_file.clone().map(Into::into),
        })
        .await?,
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            signal_cancel.cancel();
        }
    });

    // A cookie snapshot from a previous run may skip the whole flow.
    if session.load_cookies().await? {
        session.goto("https://x.com/home").await?;
    }
    if !session.is_logged_in().await? {
        if !session.login_with_2fa(&username, &password, &cancel).await? {
            return Err("login ran to completion but the timeline never appeared".into());
        }
        session.save_cookies().await?;
    }

    let generator = reply::from_config(&config);
    let bot = BotService::new(
        session.clone(),
        generator,
        username,
        config.auto_post,
        Duration::from_secs(config.bot_interval_minutes * 60),
    );

    bot.run(cancel).await;
    drop(bot);

    Arc::try_unwrap(session)
        .map_err(|_| "session still shared at shutdown")?
        .close()
        .await?;
    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "replybot_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "replybot_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
