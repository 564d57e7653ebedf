use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Which authentication flow this deployment runs. The two flows never
    /// interact; a deployment picks one.
    pub auth_strategy: AuthStrategy,
    // Twitter endpoints (overridable so tests can point at a local mock)
    pub twitter_api_base: String,
    pub twitter_token_url: String,
    // Browser login credentials (browser strategy only)
    pub twitter_username: Option<String>,
    pub twitter_password: Option<String>,
    pub headless: bool,
    pub cookie_file: Option<String>,
    // Reply generation
    pub reply_mode: ReplyMode,
    pub reply_style: String,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    // Auto-reply loop
    pub bot_interval_minutes: u64,
    pub auto_post: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Serve the token-exchange/proxy HTTP surface
    Oauth,
    /// Drive a browser session through the web login and run the bot loop
    Browser,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    Template,
    Llm,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            auth_strategy: match env::var("AUTH_STRATEGY").as_deref() {
                Ok("browser") => AuthStrategy::Browser,
                _ => AuthStrategy::Oauth,
            },
            twitter_api_base: env::var("TWITTER_API_BASE")
                .unwrap_or_else(|_| "https://api.twitter.com/2".to_string()),
            twitter_token_url: env::var("TWITTER_TOKEN_URL")
                .unwrap_or_else(|_| "https://api.twitter.com/2/oauth2/token".to_string()),
            twitter_username: env::var("TWITTER_USERNAME").ok(),
            twitter_password: env::var("TWITTER_PASSWORD").ok(),
            headless: env::var("HEADLESS")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            cookie_file: env::var("COOKIE_FILE").ok(),
            reply_mode: match env::var("REPLY_MODE").as_deref() {
                Ok("llm") => ReplyMode::Llm,
                _ => ReplyMode::Template,
            },
            reply_style: env::var("REPLY_STYLE").unwrap_or_else(|_| "helpful".to_string()),
            llm_api_key: env::var("LLM_API_KEY").ok(),
            llm_api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com/v1/chat/completions".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string()),
            bot_interval_minutes: env::var("BOT_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            auto_post: env::var("AUTO_POST")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
