pub mod health;
pub mod proxy;
pub mod token;
pub mod twitter_api;
