mod dto;
mod service;

pub use dto::{ExchangeParams, TokenExchangeRequest, TokenResponse};
pub use service::TokenService;
