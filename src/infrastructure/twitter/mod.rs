mod api;
mod oauth;

pub use api::{ProxyRequest, TwitterApiClient, UpstreamReply};
pub use oauth::TwitterOAuthClient;
