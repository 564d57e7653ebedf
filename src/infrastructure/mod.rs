pub mod browser;
pub mod config;
pub mod http;
pub mod twitter;
